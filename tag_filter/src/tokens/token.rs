//! Token definitions for filter expressions
//!
//! The lexer emits whitespace-free tokens; keyword classification of words
//! happens here, the meaning of `tag` and the comparison suffixes is decided
//! by the parser.

use crate::grammar::keywords::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Bare word `[A-Za-z_][A-Za-z0-9_-]*` that is not an operator keyword
    Ident(String),
    /// Integer or decimal literal; `text` is the exact source spelling
    Number { text: String, value: f64 },
    /// `.` path separator
    Dot,
    LParen,
    RParen,
    And,
    Or,
    Not,
    /// End of input marker
    Eof,
}

/// Token classification used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Operator,
    Literal,
    Identifier,
    Punctuation,
    Special,
}

impl Token {
    pub fn from_keyword(keyword: Keyword) -> Self {
        match keyword {
            Keyword::And => Self::And,
            Keyword::Or => Self::Or,
            Keyword::Not => Self::Not,
        }
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::And | Self::Or | Self::Not => TokenClass::Operator,
            Self::Number { .. } => TokenClass::Literal,
            Self::Ident(_) => TokenClass::Identifier,
            Self::Dot | Self::LParen | Self::RParen => TokenClass::Punctuation,
            Self::Eof => TokenClass::Special,
        }
    }

    pub fn is_identifier_with_name(&self, name: &str) -> bool {
        matches!(self, Self::Ident(word) if word == name)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Source text of a token that can appear as a tag path segment
    pub fn as_path_segment(&self) -> Option<&str> {
        match self {
            Self::Ident(word) => Some(word),
            Self::Number { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(word) => format!("identifier '{}'", word),
            Self::Number { text, .. } => format!("number '{}'", text),
            Self::Eof => "end of input".to_string(),
            other => format!("'{}'", other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(word) => write!(f, "{}", word),
            Self::Number { text, .. } => write!(f, "{}", text),
            Self::Dot => write!(f, "."),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::Eof => write!(f, "<EOF>"),
        }
    }
}

/// Classify a lexed word as an operator keyword or identifier
pub fn classify_word(word: &str) -> Token {
    match Keyword::from_str(word) {
        Some(keyword) => Token::from_keyword(keyword),
        None => Token::Ident(word.to_string()),
    }
}
