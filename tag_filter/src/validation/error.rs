//! Validation error types
//!
//! These checks mostly matter for trees that did not come from the parser,
//! e.g. ASTs loaded from a cache through serde.

use crate::logging::{codes, Code};
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Tag path is empty")]
    EmptyTagPath,

    #[error("Comparison operand for tag '{key}' is not a finite number: {value}")]
    NonFiniteComparisonOperand { key: String, value: f64 },

    #[error("Invalid tag path segment '{segment}'")]
    InvalidTagSegment { segment: String },

    #[error("Nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep { depth: usize, max: usize },
}

impl ValidationError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::EmptyTagPath => codes::validation::EMPTY_TAG_PATH,
            Self::NonFiniteComparisonOperand { .. } => {
                codes::validation::NON_FINITE_COMPARISON_OPERAND
            }
            Self::InvalidTagSegment { .. } => codes::validation::INVALID_TAG_SEGMENT,
            Self::NestingTooDeep { .. } => codes::validation::NESTING_TOO_DEEP,
        }
    }
}
