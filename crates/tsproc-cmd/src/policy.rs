//! Not-found policy shared by every selection-consuming command

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tsproc_select::SelectionResult;

use crate::error::{CmdError, CmdResult};
use crate::status::{CommandPhase, CommandStatus, Severity};

/// What to do when a selection matches nothing, or misses requested items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotFoundPolicy {
    /// No record, the command continues
    Ignore,
    /// Warning record, the command continues
    #[default]
    Warn,
    /// The command stops before any side effect
    Fail,
}

impl NotFoundPolicy {
    pub const ALL: [NotFoundPolicy; 3] = [
        NotFoundPolicy::Ignore,
        NotFoundPolicy::Warn,
        NotFoundPolicy::Fail,
    ];

    /// Name used in the `IfNotFound` parameter
    pub fn name(&self) -> &'static str {
        match self {
            NotFoundPolicy::Ignore => "Ignore",
            NotFoundPolicy::Warn => "Warn",
            NotFoundPolicy::Fail => "Fail",
        }
    }

    /// Apply the policy to a resolved selection
    ///
    /// Returns an error only under `Fail`, in which case the caller must
    /// stop before changing anything.
    pub fn apply(
        self,
        result: &SelectionResult,
        description: &str,
        status: &mut CommandStatus,
    ) -> CmdResult<()> {
        if !result.has_missing() {
            return Ok(());
        }

        let message = if result.is_empty() {
            format!("No time series matched {}", description)
        } else {
            format!(
                "{} requested time series not found for {}: {}",
                result.not_found_count(),
                description,
                result.not_found().join(", ")
            )
        };
        log::debug!("not found ({}): {}", self, message);

        match self {
            NotFoundPolicy::Ignore => Ok(()),
            NotFoundPolicy::Warn => {
                let err = CmdError::ResolutionNotFound(message);
                status.add_error(CommandPhase::Run, Severity::Warning, &err);
                Ok(())
            }
            NotFoundPolicy::Fail => Err(CmdError::ResolutionNotFound(message)),
        }
    }
}

impl FromStr for NotFoundPolicy {
    type Err = CmdError;

    fn from_str(s: &str) -> CmdResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(NotFoundPolicy::Ignore),
            "warn" => Ok(NotFoundPolicy::Warn),
            "fail" => Ok(NotFoundPolicy::Fail),
            _ => Err(CmdError::syntax(
                "IfNotFound",
                format!("'{}' is not Ignore, Warn or Fail", s),
            )),
        }
    }
}

impl fmt::Display for NotFoundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsproc_select::{resolve, SelectionSpec};
    use tsproc_series::ResultTable;

    fn empty_result() -> SelectionResult {
        resolve(&SelectionSpec::AllEntries, &ResultTable::new())
    }

    #[test]
    fn test_parse_round_trip() {
        for policy in NotFoundPolicy::ALL {
            assert_eq!(policy.name().parse::<NotFoundPolicy>().unwrap(), policy);
        }
        assert_eq!("WARN".parse::<NotFoundPolicy>().unwrap(), NotFoundPolicy::Warn);
        assert!("Maybe".parse::<NotFoundPolicy>().is_err());
        assert_eq!(NotFoundPolicy::default(), NotFoundPolicy::Warn);
    }

    #[test]
    fn test_ignore() {
        let mut status = CommandStatus::new();
        NotFoundPolicy::Ignore
            .apply(&empty_result(), "TSID=X", &mut status)
            .unwrap();
        assert!(status.is_empty());
    }

    #[test]
    fn test_warn() {
        let mut status = CommandStatus::new();
        NotFoundPolicy::Warn
            .apply(&empty_result(), "TSID=X", &mut status)
            .unwrap();
        assert_eq!(status.rollup(CommandPhase::Run), Severity::Warning);
        assert_eq!(status.records()[0].message, "No time series matched TSID=X");
    }

    #[test]
    fn test_fail() {
        let mut status = CommandStatus::new();
        let err = NotFoundPolicy::Fail
            .apply(&empty_result(), "TSID=X", &mut status)
            .unwrap_err();
        assert!(matches!(err, CmdError::ResolutionNotFound(_)));
        assert!(status.is_empty());
    }
}
