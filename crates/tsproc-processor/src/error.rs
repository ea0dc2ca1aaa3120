//! Error types for processor requests

use thiserror::Error;
use tsproc_props::PropError;
use tsproc_series::SeriesError;

/// Result type for processor requests
pub type RequestResult<T> = Result<T, RequestError>;

/// Errors returned by request handlers
///
/// Handlers return these instead of panicking so the calling command can
/// decide how severe the problem is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    /// Request parameters are invalid for the current state
    #[error("invalid request: {0}")]
    Invalid(String),

    /// A date/time token refers to a period bound that is not set
    #[error("{0} is not set")]
    Unset(String),

    /// Another caller is running commands on this processor
    #[error("processor is busy running commands")]
    Busy,

    /// A handler answered with a response of the wrong shape
    #[error("unexpected response to {request}: {response}")]
    UnexpectedResponse {
        request: &'static str,
        response: &'static str,
    },

    /// Result table error
    #[error(transparent)]
    Series(#[from] SeriesError),

    /// Property store error
    #[error(transparent)]
    Property(#[from] PropError),
}

impl RequestError {
    /// Create an invalid request error
    pub fn invalid(msg: impl Into<String>) -> Self {
        RequestError::Invalid(msg.into())
    }
}
