use crate::lexical::LexError;
use crate::logging::Code;
use crate::syntax::ParseError;
use crate::utils::format_error_at;
use crate::validation::ValidationError;

/// Any failure while turning source text into a validated expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Lexical analysis failed: {0}")]
    Lex(#[from] LexError),

    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl FilterError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Lex(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
        }
    }

    /// Byte offset into the source, when the failing stage knows one
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Lex(e) => Some(e.offset()),
            Self::Parse(e) => Some(e.offset()),
            Self::Validation(_) => None,
        }
    }

    /// Multi-line diagnostic pointing at the offending position in `source`
    pub fn render(&self, source: &str) -> String {
        let message = format!("[{}] {}", self.error_code(), self);
        match self.offset() {
            Some(offset) => format_error_at(source, offset, &message),
            None => format!("Error: {}\n", message),
        }
    }
}
