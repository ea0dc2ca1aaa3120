//! Error types for the command system
//!
//! Every error is caught at the command boundary and turned into a status
//! record; [`CmdError::recommendation`] supplies the remedy text.

use thiserror::Error;
use tsproc_processor::RequestError;
use tsproc_props::PropError;
use tsproc_select::SelectError;
use tsproc_series::SeriesError;

use crate::status::Severity;

/// Result type for command operations
pub type CmdResult<T = ()> = Result<T, CmdError>;

/// Recommendation attached to errors the user cannot fix in the command text
pub const SUPPORT_RECOMMENDATION: &str =
    "See the log file for details - report the problem to software support.";

/// Errors that can occur while validating or running a command
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CmdError {
    /// Command text could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Command not found in registry
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Parameter value has the wrong form
    #[error("invalid value for parameter '{name}': {reason}")]
    ParameterSyntax { name: String, reason: String },

    /// Required parameter not given
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Parameter not recognized by the command
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Selection did not match what was requested and the policy is `Fail`
    #[error("{0}")]
    ResolutionNotFound(String),

    /// Parameter references properties that are not defined
    #[error("parameter '{param}' references undefined properties: {}", .missing.join(", "))]
    Expansion { param: String, missing: Vec<String> },

    /// Selection parameters are inconsistent
    #[error("selection error: {0}")]
    Select(#[from] SelectError),

    /// Processor request failed
    #[error("request failed: {0}")]
    Request(#[from] RequestError),

    /// Runner configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Run was cancelled before the command started
    #[error("command aborted")]
    Aborted,

    /// The operation itself failed
    #[error("{0}")]
    Execution(String),
}

/// Errors that can occur during command parsing
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Empty command
    #[error("empty command")]
    EmptyCommand,

    /// Unterminated quoted value
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    /// Missing closing parenthesis
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// Invalid parameter name
    #[error("invalid parameter name: {0}")]
    InvalidParamName(String),

    /// Parameter given more than once
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),

    /// Generic parse error with message
    #[error("{0}")]
    Generic(String),
}

impl From<nom::Err<nom::error::Error<&str>>> for ParseError {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ParseError::UnbalancedParens,
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let snippet: String = e.input.chars().take(20).collect();
                ParseError::Generic(format!("syntax error at '{}'", snippet))
            }
        }
    }
}

impl From<SeriesError> for CmdError {
    fn from(err: SeriesError) -> Self {
        CmdError::Request(RequestError::Series(err))
    }
}

impl From<PropError> for CmdError {
    fn from(err: PropError) -> Self {
        CmdError::Request(RequestError::Property(err))
    }
}

impl CmdError {
    /// Create a parameter syntax error
    pub fn syntax(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CmdError::ParameterSyntax {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        CmdError::Execution(msg.into())
    }

    /// Severity of this error when found during validation
    pub fn severity(&self) -> Severity {
        match self {
            CmdError::UnknownParameter(_) | CmdError::Expansion { .. } => Severity::Warning,
            _ => Severity::Failure,
        }
    }

    /// Suggested remedy shown alongside the message
    pub fn recommendation(&self) -> String {
        match self {
            CmdError::Parse(_) => "Correct the command syntax.".to_string(),
            CmdError::UnknownCommand(name) => {
                format!("Check the spelling of command '{}'.", name)
            }
            CmdError::ParameterSyntax { name, .. } => {
                format!("Specify a valid value for parameter {}.", name)
            }
            CmdError::MissingParameter(name) => format!("Specify parameter {}.", name),
            CmdError::UnknownParameter(name) => {
                format!("Remove parameter {} or correct its name.", name)
            }
            CmdError::ResolutionNotFound(_) => {
                "Verify that the time series list matches existing time series.".to_string()
            }
            CmdError::Expansion { missing, .. } => format!(
                "Define property {} before this command runs.",
                missing.join(", ")
            ),
            CmdError::Select(_) => "Check the time series list parameters.".to_string(),
            CmdError::Config(_) => "Check the configuration file.".to_string(),
            CmdError::Aborted => "Run the commands again.".to_string(),
            CmdError::Request(_) | CmdError::Execution(_) => SUPPORT_RECOMMENDATION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CmdError::UnknownCommand("Foo".to_string());
        assert_eq!(format!("{}", err), "unknown command: Foo");

        let err = CmdError::syntax("Scale", "not a number");
        assert_eq!(
            format!("{}", err),
            "invalid value for parameter 'Scale': not a number"
        );

        let err = CmdError::Expansion {
            param: "TSID".to_string(),
            missing: vec!["Loc".to_string(), "Src".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "parameter 'TSID' references undefined properties: Loc, Src"
        );
    }

    #[test]
    fn test_severity_and_recommendation() {
        assert_eq!(CmdError::UnknownParameter("X".to_string()).severity(), Severity::Warning);
        assert_eq!(CmdError::MissingParameter("X".to_string()).severity(), Severity::Failure);
        assert_eq!(
            CmdError::execution("boom").recommendation(),
            SUPPORT_RECOMMENDATION
        );
    }

    #[test]
    fn test_series_error_conversion() {
        let err: CmdError = SeriesError::DuplicateAlias("A".to_string()).into();
        assert!(matches!(err, CmdError::Request(RequestError::Series(_))));
    }
}
