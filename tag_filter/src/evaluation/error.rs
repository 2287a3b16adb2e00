use crate::logging::{codes, Code};
use thiserror::Error;

/// The only runtime failure: bad tag data, distinct from a plain non-match
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Tag '{key}' has a value that is not a number")]
    NonNumericTagValue { key: String },
}

impl EvalError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::NonNumericTagValue { .. } => codes::evaluation::NON_NUMERIC_TAG_VALUE,
        }
    }

    /// Tag key whose value caused the failure
    pub fn key(&self) -> &str {
        match self {
            Self::NonNumericTagValue { key } => key,
        }
    }
}
