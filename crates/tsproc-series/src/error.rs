//! Error types for the time series data model

use thiserror::Error;

/// Result type for data model operations
pub type SeriesResult<T> = Result<T, SeriesError>;

/// Errors that can occur when building or storing time series
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeriesError {
    /// Identifier text could not be parsed
    #[error("invalid time series identifier '{ident}': {reason}")]
    InvalidIdent { ident: String, reason: String },

    /// Interval text could not be parsed
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// Another entry already declares this alias
    #[error("alias '{0}' is already used by another time series")]
    DuplicateAlias(String),

    /// Another non-ensemble entry already has this identity
    #[error("time series '{0}' already exists")]
    DuplicateIdent(String),

    /// Position outside the table
    #[error("index {index} out of range (table has {len} time series)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Period end precedes period start
    #[error("period end {end} is before start {start}")]
    InvalidPeriod { start: String, end: String },
}

impl SeriesError {
    /// Create an invalid identifier error
    pub fn invalid_ident(ident: impl Into<String>, reason: impl Into<String>) -> Self {
        SeriesError::InvalidIdent {
            ident: ident.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SeriesError::DuplicateAlias("Flow".to_string());
        assert_eq!(
            err.to_string(),
            "alias 'Flow' is already used by another time series"
        );

        let err = SeriesError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range (table has 3 time series)");
    }
}
