//! error type shared by every operator family

use thiserror::Error;

/// error returned when an operator cannot be applied to its inputs
#[derive(Debug, Error)]
pub enum OperatorError {
    /// the operator was given the wrong number of arguments
    #[error("operator '{op}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        op: String,
        expected: usize,
        got: usize,
    },

    /// the variant has no evaluation semantics on this path (or is unknown)
    #[error("operator '{op}' is not supported here")]
    UnsupportedVariant { op: String },

    /// a division fold hit a zero divisor
    #[error("division by zero at argument {index}")]
    DivisionByZero { index: usize },

    /// range bounds were passed as (max, min)
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: String, max: String },

    /// a keyword could not be compiled as a regular expression
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl OperatorError {
    pub fn arity(op: impl ToString, expected: usize, got: usize) -> Self {
        Self::ArityMismatch {
            op: op.to_string(),
            expected,
            got,
        }
    }

    pub fn unsupported(op: impl ToString) -> Self {
        let op = op.to_string();
        Self::UnsupportedVariant {
            op: if op.is_empty() {
                "unknown".to_string()
            } else {
                op
            },
        }
    }
}
