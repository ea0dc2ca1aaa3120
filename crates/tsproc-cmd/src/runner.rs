//! Command runner
//!
//! Runs a list of commands in order against one processor. A command that
//! fails only stops itself; the runner records the failure and moves on.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tsproc_processor::{Processor, SharedProcessor};

use crate::args::ParsedCommand;
use crate::command::{validate_params, Command, CommandContext, CommandRegistry};
use crate::error::{CmdError, CmdResult};
use crate::parser::{parse_command, parse_script, ScriptLine};
use crate::policy::NotFoundPolicy;
use crate::status::{CommandPhase, CommandStatus, Severity};

/// Runner options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Suppress informational command output
    pub quiet: bool,
    /// Log each command's text before running it
    pub echo: bool,
    /// Stop the run after the first command whose Run phase fails
    pub stop_on_failure: bool,
    /// Policy for commands that omit `IfNotFound`
    pub default_not_found: NotFoundPolicy,
}

impl RunnerConfig {
    /// Load from JSON text; missing fields take their defaults
    pub fn from_json_str(text: &str) -> CmdResult<Self> {
        serde_json::from_str(text).map_err(|e| CmdError::Config(e.to_string()))
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> CmdResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CmdError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}

/// Cooperative cancellation flag, checked between commands
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the running command finishes first
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear a previous cancellation
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One command in the runner's list
pub struct CommandEntry {
    /// 1-based script line, 0 for commands added directly
    pub line: usize,
    /// Command text as written
    pub text: String,
    parsed: Option<ParsedCommand>,
    command: Option<Arc<dyn Command>>,
    status: CommandStatus,
}

impl CommandEntry {
    fn new(registry: &CommandRegistry, line: usize, text: String, parsed: Result<ParsedCommand, CmdError>) -> Self {
        let command = parsed
            .as_ref()
            .ok()
            .and_then(|p| registry.get(&p.name));
        let mut entry = Self {
            line,
            text,
            parsed: parsed.as_ref().ok().cloned(),
            command,
            status: CommandStatus::new(),
        };
        entry.initialize(parsed.err());
        entry
    }

    /// Initialize phase: parameter checks only, no processor access
    fn initialize(&mut self, parse_error: Option<CmdError>) {
        let phase = CommandPhase::Initialize;
        self.status.clear(phase);

        if let Some(err) = parse_error {
            self.status.add_error(phase, Severity::Failure, &err);
            return;
        }
        let (Some(parsed), command) = (&self.parsed, &self.command) else {
            return;
        };
        let Some(command) = command else {
            let err = CmdError::UnknownCommand(parsed.name.clone());
            self.status.add_error(phase, Severity::Failure, &err);
            return;
        };

        for problem in validate_params(command.params(), parsed) {
            self.status.add_error(phase, problem.severity(), &problem);
        }
        if self.status.rollup(phase) < Severity::Failure {
            if let Err(err) = command.validate(parsed) {
                self.status.add_error(phase, Severity::Failure, &err);
            }
        }
    }

    /// Command name, or the text when it did not parse
    pub fn name(&self) -> &str {
        match &self.parsed {
            Some(parsed) => &parsed.name,
            None => &self.text,
        }
    }

    /// Canonical text of the command
    pub fn describe(&self) -> String {
        match (&self.command, &self.parsed) {
            (Some(command), Some(parsed)) => command.describe(parsed),
            _ => self.text.clone(),
        }
    }

    /// Parsed command, if the text parsed
    pub fn parsed(&self) -> Option<&ParsedCommand> {
        self.parsed.as_ref()
    }

    /// Status records of both phases
    pub fn status(&self) -> &CommandStatus {
        &self.status
    }

    /// Whether the Run phase may start
    pub fn is_runnable(&self) -> bool {
        self.command.is_some() && self.status.rollup(CommandPhase::Initialize) < Severity::Failure
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("line", &self.line)
            .field("text", &self.text)
            .field("status", &self.status)
            .finish()
    }
}

/// Outcome of one command in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSummary {
    pub line: usize,
    pub text: String,
    pub initialize: Severity,
    pub run: Severity,
    pub warnings: usize,
    pub failures: usize,
}

/// Outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub commands: Vec<CommandSummary>,
    /// Most severe Run-phase result across all commands
    pub severity: Severity,
    /// Whether the run stopped before the last command
    pub cancelled: bool,
}

impl RunSummary {
    pub fn warning_count(&self) -> usize {
        self.commands.iter().map(|c| c.warnings).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.commands.iter().map(|c| c.failures).sum()
    }

    /// Commands whose Run phase failed
    pub fn failed(&self) -> impl Iterator<Item = &CommandSummary> {
        self.commands.iter().filter(|c| c.run == Severity::Failure)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.commands {
            if c.warnings > 0 || c.failures > 0 {
                writeln!(
                    f,
                    "{:>4}  {:<8} {} warning(s), {} failure(s)  {}",
                    c.line, c.run, c.warnings, c.failures, c.text
                )?;
            }
        }
        write!(
            f,
            "{} command(s), {} warning(s), {} failure(s), overall {}",
            self.commands.len(),
            self.warning_count(),
            self.failure_count(),
            self.severity
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Runs commands in order, continuing past failures
pub struct CommandRunner {
    registry: CommandRegistry,
    config: RunnerConfig,
    entries: Vec<CommandEntry>,
    cancel: CancelToken,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl CommandRunner {
    /// Create a runner with the built-in commands
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_registry(CommandRegistry::with_builtins(), config)
    }

    /// Create a runner with a custom registry
    pub fn with_registry(registry: CommandRegistry, config: RunnerConfig) -> Self {
        Self {
            registry,
            config,
            entries: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Get a reference to the command registry
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Get a mutable reference to the command registry
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Token that cancels this runner's runs
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Commands in run order
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Remove all commands
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the command list with a script's commands
    ///
    /// Each command is initialized as it is loaded; lines that do not parse
    /// or name an unknown command keep an Initialize failure.
    pub fn load_script(&mut self, script: &str) -> usize {
        self.entries.clear();
        for ScriptLine { line, text, parsed } in parse_script(script) {
            let entry = CommandEntry::new(&self.registry, line, text, parsed.map_err(CmdError::from));
            self.entries.push(entry);
        }
        log::debug!("loaded {} command(s)", self.entries.len());
        self.entries.len()
    }

    /// Append one command, returning its position
    pub fn add_command(&mut self, text: &str) -> usize {
        let parsed = parse_command(text).map_err(CmdError::from);
        let entry = CommandEntry::new(&self.registry, 0, text.trim().to_string(), parsed);
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Run every command
    pub fn run(&mut self, processor: &mut Processor) -> RunSummary {
        let indices: Vec<usize> = (0..self.entries.len()).collect();
        self.run_indices(processor, &indices)
    }

    /// Run every command while holding a shared processor
    pub fn run_shared(&mut self, shared: &SharedProcessor) -> RunSummary {
        let mut guard = shared.begin_run();
        self.run(&mut guard)
    }

    /// Run the commands at the given positions, in the order given
    pub fn run_indices(&mut self, processor: &mut Processor, indices: &[usize]) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut stopped = false;

        for &index in indices {
            let Some(entry) = self.entries.get_mut(index) else {
                log::warn!("No command at position {}", index);
                continue;
            };

            if stopped || self.cancel.is_cancelled() {
                stopped = true;
                entry.status.clear(CommandPhase::Run);
                entry
                    .status
                    .add_error(CommandPhase::Run, Severity::Warning, &CmdError::Aborted);
            } else {
                run_entry(entry, processor, &self.config);
                if self.config.stop_on_failure
                    && entry.status.rollup(CommandPhase::Run) == Severity::Failure
                {
                    log::info!("Stopping after failure in: {}", entry.text);
                    stopped = true;
                }
            }

            summary.commands.push(summarize(entry));
        }

        summary.cancelled = stopped;
        summary.severity = summary
            .commands
            .iter()
            .map(|c| c.run)
            .max()
            .unwrap_or_default();
        log::info!(
            "Ran {} command(s): {} warning(s), {} failure(s), overall {}",
            summary.commands.len(),
            summary.warning_count(),
            summary.failure_count(),
            summary.severity
        );
        summary
    }
}

/// Run phase of one entry; every error ends up as a status record
fn run_entry(entry: &mut CommandEntry, processor: &mut Processor, config: &RunnerConfig) {
    let phase = CommandPhase::Run;
    entry.status.clear(phase);

    if !entry.is_runnable() {
        entry.status.add(
            phase,
            Severity::Failure,
            "Command was not run because of initialization errors.",
            "Correct the command and run again.",
        );
        return;
    }
    let (Some(command), Some(args)) = (entry.command.clone(), entry.parsed.as_ref()) else {
        return;
    };

    if config.echo {
        log::info!("> {}", entry.text);
    }

    let mut ctx = CommandContext::new(processor, &mut entry.status)
        .with_quiet(config.quiet)
        .with_not_found(config.default_not_found);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| command.run(&mut ctx, args)));

    let err = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Some(CmdError::execution(format!(
                "Unexpected error in {}: {}",
                command.name(),
                msg
            )))
        }
    };
    if let Some(err) = err {
        entry.status.add_error(phase, Severity::Failure, &err);
    }
    log::debug!("{} finished: {}", entry.name(), entry.status.rollup(phase));
}

fn summarize(entry: &CommandEntry) -> CommandSummary {
    let status = &entry.status;
    let count = |severity| {
        status.count(CommandPhase::Initialize, severity) + status.count(CommandPhase::Run, severity)
    };
    CommandSummary {
        line: entry.line,
        text: entry.text.clone(),
        initialize: status.rollup(CommandPhase::Initialize),
        run: status.rollup(CommandPhase::Run),
        warnings: count(Severity::Warning),
        failures: count(Severity::Failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ParsedCommand;

    struct PanicCommand;

    impl Command for PanicCommand {
        fn name(&self) -> &str {
            "Panic"
        }

        fn run(&self, _ctx: &mut CommandContext<'_>, _args: &ParsedCommand) -> CmdResult {
            panic!("boom")
        }
    }

    #[test]
    fn test_config_from_json() {
        let config = RunnerConfig::from_json_str(r#"{"echo": true, "default_not_found": "Fail"}"#)
            .unwrap();
        assert!(config.echo);
        assert!(!config.stop_on_failure);
        assert_eq!(config.default_not_found, NotFoundPolicy::Fail);

        assert_eq!(RunnerConfig::from_json_str("{}").unwrap(), RunnerConfig::default());
        assert!(matches!(
            RunnerConfig::from_json_str("{"),
            Err(CmdError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_command_fails_initialize() {
        let mut runner = CommandRunner::default();
        runner.load_script("NoSuchCommand(X=1)\nFree(");
        let entries = runner.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status().rollup(CommandPhase::Initialize), Severity::Failure);
        assert_eq!(entries[1].status().rollup(CommandPhase::Initialize), Severity::Failure);
        assert!(!entries[0].is_runnable());

        let mut processor = Processor::new();
        let summary = runner.run(&mut processor);
        assert_eq!(summary.severity, Severity::Failure);
        assert_eq!(summary.commands.len(), 2);
    }

    #[test]
    fn test_panic_is_contained() {
        let mut registry = CommandRegistry::with_builtins();
        registry.register(PanicCommand);
        let mut runner = CommandRunner::with_registry(registry, RunnerConfig::default());
        runner.add_command("Panic()");
        runner.add_command("SetProperty(PropertyName=After,PropertyValue=1)");

        let mut processor = Processor::new();
        let summary = runner.run(&mut processor);
        assert_eq!(summary.commands[0].run, Severity::Failure);
        assert_eq!(summary.commands[1].run, Severity::Success);
        assert!(processor.props().contains("After"));
        assert!(runner.entries()[0].status().records()[0].message.contains("boom"));
    }

    #[test]
    fn test_cancel_between_commands() {
        let mut runner = CommandRunner::default();
        runner.add_command("SetProperty(PropertyName=A,PropertyValue=1)");
        runner.cancel_token().cancel();

        let mut processor = Processor::new();
        let summary = runner.run(&mut processor);
        assert!(summary.cancelled);
        assert!(!processor.props().contains("A"));
        assert_eq!(summary.severity, Severity::Warning);

        runner.cancel_token().reset();
        let summary = runner.run(&mut processor);
        assert!(!summary.cancelled);
        assert!(processor.props().contains("A"));
    }

    #[test]
    fn test_stop_on_failure() {
        let config = RunnerConfig {
            stop_on_failure: true,
            ..RunnerConfig::default()
        };
        let mut runner = CommandRunner::new(config);
        runner.add_command("Free(TSList=AllMatchingTSID,TSID=X*,IfNotFound=Fail)");
        runner.add_command("SetProperty(PropertyName=A,PropertyValue=1)");

        let mut processor = Processor::new();
        let summary = runner.run(&mut processor);
        assert!(summary.cancelled);
        assert!(!processor.props().contains("A"));
    }

    #[test]
    fn test_run_shared_marks_busy() {
        let shared = SharedProcessor::default();
        let mut runner = CommandRunner::default();
        runner.add_command("SetProperty(PropertyName=A,PropertyValue=1)");
        let summary = runner.run_shared(&shared);
        assert_eq!(summary.severity, Severity::Success);
        assert!(!shared.is_busy());
        assert!(shared.try_with(|p| p.props().contains("A")).unwrap());
    }

    #[test]
    fn test_summary_display() {
        let mut runner = CommandRunner::default();
        runner.load_script("Message(Message=Careful,CommandStatus=Warning)");
        let mut processor = Processor::new();
        let summary = runner.run(&mut processor);
        let text = summary.to_string();
        assert!(text.contains("1 warning(s)"));
        assert!(text.ends_with("overall Warning"));
    }
}
