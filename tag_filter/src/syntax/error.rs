//! Parse error types with offset-accurate reporting
//!
//! Every variant carries the byte offset of the offending token. A parse
//! error always rejects the whole expression; no partial AST is returned.

use crate::logging::{codes, Code};

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected {found} at offset {offset}: expected {expected}")]
    UnexpectedToken {
        offset: usize,
        found: String,
        expected: String,
    },

    #[error("Unbalanced parenthesis at offset {offset}")]
    UnbalancedParens { offset: usize },

    #[error("Empty expression at offset {offset}")]
    EmptyExpression { offset: usize },

    #[error("Invalid comparison operand {found} at offset {offset}: expected a single number")]
    InvalidComparisonOperand { offset: usize, found: String },

    #[error("Unexpected {found} at offset {offset} after complete expression")]
    TrailingTokens { offset: usize, found: String },

    #[error("Nesting depth {depth} exceeds maximum {max} at offset {offset}")]
    NestingTooDeep {
        offset: usize,
        depth: usize,
        max: usize,
    },
}

impl ParseError {
    pub fn unexpected_token(offset: usize, found: impl Into<String>, expected: &str) -> Self {
        Self::UnexpectedToken {
            offset,
            found: found.into(),
            expected: expected.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnbalancedParens { .. } => codes::syntax::UNBALANCED_PARENS,
            Self::EmptyExpression { .. } => codes::syntax::EMPTY_EXPRESSION,
            Self::InvalidComparisonOperand { .. } => codes::syntax::INVALID_COMPARISON_OPERAND,
            Self::TrailingTokens { .. } => codes::syntax::TRAILING_TOKENS,
            Self::NestingTooDeep { .. } => codes::syntax::NESTING_TOO_DEEP,
        }
    }

    /// Byte offset of the offending token
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedToken { offset, .. }
            | Self::UnbalancedParens { offset }
            | Self::EmptyExpression { offset }
            | Self::InvalidComparisonOperand { offset, .. }
            | Self::TrailingTokens { offset, .. }
            | Self::NestingTooDeep { offset, .. } => *offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_offsets() {
        let err = ParseError::unexpected_token(9, "end of input", "expression");
        assert_eq!(err.error_code(), codes::syntax::UNEXPECTED_TOKEN);
        assert_eq!(err.offset(), 9);
        assert_eq!(
            err.to_string(),
            "Unexpected end of input at offset 9: expected expression"
        );

        let err = ParseError::NestingTooDeep {
            offset: 3,
            depth: 65,
            max: 64,
        };
        assert_eq!(err.error_code(), codes::syntax::NESTING_TOO_DEEP);
        assert_eq!(err.offset(), 3);
    }
}
