//! Two-phase command status log

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CmdError;

/// Phase a status record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandPhase {
    /// Parameter checks, before the table is touched
    Initialize,
    /// Resolution and side effects
    Run,
}

impl fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandPhase::Initialize => f.write_str("Initialize"),
            CommandPhase::Run => f.write_str("Run"),
        }
    }
}

/// Record severity, ordered `Success < Warning < Failure`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Success,
    Warning,
    Failure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => f.write_str("Success"),
            Severity::Warning => f.write_str("Warning"),
            Severity::Failure => f.write_str("Failure"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = CmdError;

    fn from_str(s: &str) -> Result<Self, CmdError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Severity::Success),
            "warning" => Ok(Severity::Warning),
            "failure" => Ok(Severity::Failure),
            _ => Err(CmdError::syntax(
                "CommandStatus",
                format!("'{}' is not Success, Warning or Failure", s),
            )),
        }
    }
}

/// One status record, never changed after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub phase: CommandPhase,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.phase, self.severity, self.message)?;
        if !self.recommendation.is_empty() {
            write!(f, " ({})", self.recommendation)?;
        }
        Ok(())
    }
}

/// Status records of one command
///
/// Each phase clears its own records before running so re-running a
/// command never accumulates stale messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStatus {
    records: Vec<StatusRecord>,
}

impl CommandStatus {
    /// Create an empty status
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all records of a phase
    pub fn clear(&mut self, phase: CommandPhase) {
        self.records.retain(|r| r.phase != phase);
    }

    /// Append a record
    pub fn add(
        &mut self,
        phase: CommandPhase,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        let record = StatusRecord {
            phase,
            severity,
            message: message.into(),
            recommendation: recommendation.into(),
        };
        match severity {
            Severity::Failure => log::error!("{}", record),
            Severity::Warning => log::warn!("{}", record),
            Severity::Success => log::debug!("{}", record),
        }
        self.records.push(record);
    }

    /// Append a record for an error at the given severity
    pub fn add_error(&mut self, phase: CommandPhase, severity: Severity, err: &CmdError) {
        self.add(phase, severity, err.to_string(), err.recommendation());
    }

    /// Most severe record of a phase, `Success` if there are none
    pub fn rollup(&self, phase: CommandPhase) -> Severity {
        self.records_for(phase)
            .map(|r| r.severity)
            .max()
            .unwrap_or_default()
    }

    /// Most severe record of either phase
    pub fn overall(&self) -> Severity {
        self.records
            .iter()
            .map(|r| r.severity)
            .max()
            .unwrap_or_default()
    }

    /// Number of records of a phase with the given severity
    pub fn count(&self, phase: CommandPhase, severity: Severity) -> usize {
        self.records_for(phase)
            .filter(|r| r.severity == severity)
            .count()
    }

    /// All records in the order added
    pub fn records(&self) -> &[StatusRecord] {
        &self.records
    }

    /// Records of one phase
    pub fn records_for(&self, phase: CommandPhase) -> impl Iterator<Item = &StatusRecord> {
        self.records.iter().filter(move |r| r.phase == phase)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Success < Severity::Warning);
        assert!(Severity::Warning < Severity::Failure);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_rollup() {
        let mut status = CommandStatus::new();
        assert_eq!(status.rollup(CommandPhase::Run), Severity::Success);

        status.add(CommandPhase::Run, Severity::Warning, "w", "");
        status.add(CommandPhase::Run, Severity::Failure, "f", "");
        status.add(CommandPhase::Initialize, Severity::Warning, "i", "");

        assert_eq!(status.rollup(CommandPhase::Run), Severity::Failure);
        assert_eq!(status.rollup(CommandPhase::Initialize), Severity::Warning);
        assert_eq!(status.count(CommandPhase::Run, Severity::Warning), 1);
        assert_eq!(status.overall(), Severity::Failure);
    }

    #[test]
    fn test_clear_phase() {
        let mut status = CommandStatus::new();
        status.add(CommandPhase::Initialize, Severity::Warning, "init", "");
        status.add(CommandPhase::Run, Severity::Failure, "run", "");

        status.clear(CommandPhase::Run);
        assert_eq!(status.records().len(), 1);
        assert_eq!(status.rollup(CommandPhase::Run), Severity::Success);
        assert_eq!(status.rollup(CommandPhase::Initialize), Severity::Warning);
    }

    #[test]
    fn test_record_display() {
        let record = StatusRecord {
            phase: CommandPhase::Run,
            severity: Severity::Warning,
            message: "No time series matched".to_string(),
            recommendation: "Check TSID.".to_string(),
        };
        assert_eq!(
            record.to_string(),
            "[Run Warning] No time series matched (Check TSID.)"
        );
    }
}
