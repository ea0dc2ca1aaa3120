//! Error types for the property store

use thiserror::Error;

/// Result type for property operations
pub type PropResult<T> = Result<T, PropError>;

/// Errors that can occur when working with properties
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropError {
    /// Property not found
    #[error("Property not found: {0}")]
    NotFound(String),

    /// Property name cannot be stored or referenced
    #[error("Invalid property name '{0}'")]
    InvalidName(String),

    /// Unknown property type name
    #[error("Unknown property type '{0}'")]
    UnknownType(String),

    /// Text could not be converted to the requested type
    #[error("Invalid {expected} value '{value}'")]
    InvalidValue {
        expected: &'static str,
        value: String,
    },

    /// Type mismatch when reading a value
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl PropError {
    /// Create an invalid value error
    pub fn invalid_value(expected: &'static str, value: impl Into<String>) -> Self {
        PropError::InvalidValue {
            expected,
            value: value.into(),
        }
    }
}
