//! Error types for selection specifications
//!
//! Resolution itself cannot fail; these errors come from building a
//! specification out of command parameter text.

use thiserror::Error;

/// Errors that can occur while building a selection specification
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectError {
    /// Selection kind name is not one of the fixed names
    #[error("unknown time series list kind: {0}")]
    UnknownKind(String),

    /// A kind was given without the parameter it needs
    #[error("{kind} requires {parameter}")]
    MissingParameter { kind: String, parameter: String },

    /// Position list text could not be parsed
    #[error("invalid position list '{text}': {reason}")]
    InvalidPosition { text: String, reason: String },
}

/// Result type for selection specification operations
pub type SelectResult<T> = Result<T, SelectError>;

impl SelectError {
    /// Create a missing parameter error
    pub fn missing(kind: impl Into<String>, parameter: impl Into<String>) -> Self {
        SelectError::MissingParameter {
            kind: kind.into(),
            parameter: parameter.into(),
        }
    }
}
