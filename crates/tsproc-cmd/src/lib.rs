//! Time Series Command System
//!
//! This crate provides the command parsing, status logging and execution
//! layer of the time series processor.
//!
//! # Overview
//!
//! Commands are written one per line as `Name(Key=Value,...)`. Each command
//! goes through two phases:
//!
//! - **Initialize**: parameters are checked against their definitions; the
//!   processor is not touched
//! - **Run**: parameters are expanded (`${Name}`), the time series list is
//!   resolved, the not-found policy is applied and side effects happen
//!
//! Each phase records its outcome in the command's [`CommandStatus`]. A
//! failing command stops only itself; the runner goes on with the next one.
//!
//! # Example
//!
//! ```rust
//! use tsproc_cmd::{CommandRunner, RunnerConfig};
//! use tsproc_processor::Processor;
//!
//! let mut processor = Processor::new();
//! let mut runner = CommandRunner::new(RunnerConfig::default());
//! runner.load_script(
//!     "SetOutputPeriod(OutputStart=2020-01-01,OutputEnd=2020-01-31)\n\
//!      NewTimeSeries(Alias=Flow,NewTSID=\"Gage1.USGS.Streamflow.Day\",InitialValue=1)\n\
//!      Scale(TSList=AllMatchingTSID,TSID=Flow,ScaleValue=2)",
//! );
//! let summary = runner.run(&mut processor);
//! assert_eq!(summary.failure_count(), 0);
//! ```
//!
//! # Architecture
//!
//! - **Parser**: parses command text into [`ParsedCommand`] objects
//! - **Command trait**: interface for implementing commands
//! - **CommandRegistry**: maps command names to implementations
//! - **CommandContext**: a running command's access to the processor
//! - **NotFoundPolicy**: the `IfNotFound` contract shared by all commands
//! - **CommandRunner**: runs commands in order and summarizes the run

mod args;
mod command;
pub mod commands;
mod error;
mod parser;
mod policy;
mod runner;
mod status;

// Re-export main types
pub use args::{quote_value, ParamDef, ParamKind, ParsedCommand};
pub use command::{validate_params, Command, CommandContext, CommandRegistry};
pub use commands::transform::apply_operation;
pub use commands::{AddConstantOp, FillConstantOp, ScaleOp, SeriesOperation};
pub use error::{CmdError, CmdResult, ParseError, SUPPORT_RECOMMENDATION};
pub use parser::{normalize_legacy, parse_command, parse_script, ScriptLine};
pub use policy::NotFoundPolicy;
pub use runner::{
    CancelToken, CommandEntry, CommandRunner, CommandSummary, RunSummary, RunnerConfig,
};
pub use status::{CommandPhase, CommandStatus, Severity, StatusRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::args::{ParamDef, ParamKind, ParsedCommand};
    pub use crate::command::{Command, CommandContext, CommandRegistry};
    pub use crate::error::{CmdError, CmdResult};
    pub use crate::parser::parse_command;
    pub use crate::policy::NotFoundPolicy;
    pub use crate::runner::{CommandRunner, RunnerConfig};
    pub use crate::status::{CommandPhase, CommandStatus, Severity};
}
