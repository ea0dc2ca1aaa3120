//! Command trait, execution context and registry

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use ahash::AHashMap;
use chrono::NaiveDateTime;
use tsproc_processor::{Processor, Request, RequestError, Response};
use tsproc_props::{Expansion, PropValue, PropertyStore};
use tsproc_select::{SelectionKind, SelectionResult, SelectionSpec};
use tsproc_series::TimeSeries;

use crate::args::{ParamDef, ParsedCommand};
use crate::error::{CmdError, CmdResult};
use crate::policy::NotFoundPolicy;
use crate::status::{CommandPhase, CommandStatus, Severity};

/// Destructure a processor response, reporting a mismatched variant
macro_rules! expect_response {
    ($response:expr, $request:literal, $pattern:pat => $value:expr) => {
        match $response {
            $pattern => Ok($value),
            other => Err(CmdError::Request(RequestError::UnexpectedResponse {
                request: $request,
                response: other.name(),
            })),
        }
    };
}

/// Command execution context
///
/// Gives a running command access to the processor through requests and to
/// its own status log. Parameter values are expanded here, at Run time.
pub struct CommandContext<'a> {
    processor: &'a mut Processor,
    status: &'a mut CommandStatus,
    /// Whether to suppress output messages
    pub quiet: bool,
    /// Policy used when a command omits `IfNotFound`
    pub default_not_found: NotFoundPolicy,
}

impl<'a> CommandContext<'a> {
    /// Create a new command context
    pub fn new(processor: &'a mut Processor, status: &'a mut CommandStatus) -> Self {
        Self {
            processor,
            status,
            quiet: false,
            default_not_found: NotFoundPolicy::default(),
        }
    }

    /// Set the quiet flag
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the default not-found policy
    pub fn with_not_found(mut self, policy: NotFoundPolicy) -> Self {
        self.default_not_found = policy;
        self
    }

    /// Read-only view of the processor
    pub fn processor(&self) -> &Processor {
        &*self.processor
    }

    /// Read-only view of the property store
    pub fn props(&self) -> &PropertyStore {
        self.processor.props()
    }

    /// Status log of the running command
    pub fn status(&mut self) -> &mut CommandStatus {
        &mut *self.status
    }

    /// Print a message (unless quiet mode is enabled)
    pub fn print(&self, msg: &str) {
        if !self.quiet {
            log::info!("{}", msg);
        }
    }

    /// Print an error message (even in quiet mode)
    pub fn error(&self, msg: &str) {
        log::error!("{}", msg);
    }

    /// Add a Run-phase warning
    pub fn warn(&mut self, message: impl Into<String>, recommendation: impl Into<String>) {
        self.status
            .add(CommandPhase::Run, Severity::Warning, message, recommendation);
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    /// Send a request to the processor
    pub fn request(&mut self, request: Request) -> CmdResult<Response> {
        Ok(self.processor.request(request)?)
    }

    /// Resolve a selection, without applying any policy
    pub fn resolve(&mut self, spec: SelectionSpec) -> CmdResult<SelectionResult> {
        let response = self.request(Request::ResolveSelection { spec })?;
        expect_response!(response, "ResolveSelection", Response::Selection(r) => r)
    }

    /// Copy of the entry at `index`
    pub fn entry(&mut self, index: usize) -> CmdResult<TimeSeries> {
        let response = self.request(Request::GetEntry { index })?;
        expect_response!(response, "GetEntry", Response::Entry(ts) => *ts)
    }

    /// Remove the entry at `index`
    pub fn remove_entry(&mut self, index: usize) -> CmdResult<TimeSeries> {
        let response = self.request(Request::RemoveEntry { index })?;
        expect_response!(response, "RemoveEntry", Response::Entry(ts) => *ts)
    }

    /// Append an entry, returning its index
    pub fn append_entry(&mut self, series: TimeSeries) -> CmdResult<usize> {
        let response = self.request(Request::AppendEntry { series })?;
        expect_response!(response, "AppendEntry", Response::Index(i) => i)
    }

    /// Replace the entry at `index`, returning the previous one
    pub fn replace_entry(&mut self, index: usize, series: TimeSeries) -> CmdResult<TimeSeries> {
        let response = self.request(Request::ReplaceEntry { index, series })?;
        expect_response!(response, "ReplaceEntry", Response::Entry(ts) => *ts)
    }

    /// Set the selection flag of the entry at `index`
    pub fn set_selected(&mut self, index: usize, selected: bool) -> CmdResult {
        let response = self.request(Request::SetSelected { index, selected })?;
        expect_response!(response, "SetSelected", Response::Done => ())
    }

    /// Look up a property
    pub fn property(&mut self, name: &str) -> CmdResult<Option<PropValue>> {
        let response = self.request(Request::GetProperty {
            name: name.to_string(),
        })?;
        expect_response!(response, "GetProperty", Response::Property(v) => v)
    }

    /// Set a property, returning the previous value
    pub fn set_property(&mut self, name: &str, value: PropValue) -> CmdResult<Option<PropValue>> {
        let response = self.request(Request::SetProperty {
            name: name.to_string(),
            value,
        })?;
        expect_response!(response, "SetProperty", Response::Property(v) => v)
    }

    /// Expand `${Name}` references
    pub fn expand(&mut self, text: &str) -> CmdResult<Expansion> {
        let response = self.request(Request::ExpandText {
            text: text.to_string(),
        })?;
        expect_response!(response, "ExpandText", Response::Expanded(e) => e)
    }

    /// Resolve a date/time token
    pub fn datetime(&mut self, token: &str) -> CmdResult<NaiveDateTime> {
        let response = self.request(Request::ParseDateTime {
            token: token.to_string(),
        })?;
        expect_response!(response, "ParseDateTime", Response::DateTime(dt) => dt)
    }

    /// Distinct ensemble ids in table order
    pub fn ensemble_ids(&mut self) -> CmdResult<Vec<String>> {
        let response = self.request(Request::ListEnsembles)?;
        expect_response!(response, "ListEnsembles", Response::Names(n) => n)
    }

    /// Number of entries in the table
    pub fn table_size(&mut self) -> CmdResult<usize> {
        let response = self.request(Request::TableSize)?;
        expect_response!(response, "TableSize", Response::Size(n) => n)
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Expanded parameter value
    ///
    /// Undefined references are left as written and reported as a warning.
    pub fn param(&mut self, args: &ParsedCommand, name: &str) -> CmdResult<Option<String>> {
        let Some(raw) = args.get(name) else {
            return Ok(None);
        };
        let expansion = self.expand(raw)?;
        if !expansion.is_complete() {
            let err = CmdError::Expansion {
                param: name.to_string(),
                missing: expansion.missing,
            };
            self.status
                .add_error(CommandPhase::Run, err.severity(), &err);
        }
        Ok(Some(expansion.text))
    }

    /// Expanded parameter value; undefined references are an error
    pub fn param_strict(&mut self, args: &ParsedCommand, name: &str) -> CmdResult<Option<String>> {
        let Some(raw) = args.get(name) else {
            return Ok(None);
        };
        let expansion = self.expand(raw)?;
        if !expansion.is_complete() {
            return Err(CmdError::Expansion {
                param: name.to_string(),
                missing: expansion.missing,
            });
        }
        Ok(Some(expansion.text))
    }

    /// Expanded value of a required parameter
    pub fn require(&mut self, args: &ParsedCommand, name: &str) -> CmdResult<String> {
        self.param_strict(args, name)?
            .ok_or_else(|| CmdError::MissingParameter(name.to_string()))
    }

    /// Expanded parameter value converted with `FromStr`
    pub fn param_parsed<T>(&mut self, args: &ParsedCommand, name: &str) -> CmdResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.param_strict(args, name)? {
            Some(text) if !text.trim().is_empty() => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| CmdError::syntax(name, e.to_string())),
            _ => Ok(None),
        }
    }

    /// Boolean parameter (`True`/`False`), with default
    pub fn param_bool(&mut self, args: &ParsedCommand, name: &str, default: bool) -> CmdResult<bool> {
        match self.param_strict(args, name)? {
            None => Ok(default),
            Some(text) => match text.trim().to_ascii_lowercase().as_str() {
                "" => Ok(default),
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(CmdError::syntax(name, format!("'{}' is not True or False", text))),
            },
        }
    }

    /// Date/time parameter, resolving tokens such as `OutputStart`
    pub fn param_datetime(
        &mut self,
        args: &ParsedCommand,
        name: &str,
    ) -> CmdResult<Option<NaiveDateTime>> {
        let Some(raw) = args.get(name).filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        // The token resolver expands references itself
        self.datetime(raw)
            .map(Some)
            .map_err(|e| CmdError::syntax(name, e.to_string()))
    }

    /// `IfNotFound` policy, or the default when omitted
    pub fn not_found_policy(&mut self, args: &ParsedCommand) -> CmdResult<NotFoundPolicy> {
        Ok(self
            .param_parsed(args, "IfNotFound")?
            .unwrap_or(self.default_not_found))
    }

    /// Selection specification from `TSList` and its companion parameters
    ///
    /// Without `TSList`, a given `TSID` means `AllMatchingTSID`, otherwise `AllTS`.
    pub fn selection_spec(&mut self, args: &ParsedCommand) -> CmdResult<SelectionSpec> {
        let tsid = self.param(args, "TSID")?;
        let kind = match self.param_parsed::<SelectionKind>(args, "TSList")? {
            Some(kind) => kind,
            None if tsid.is_some() => SelectionKind::AllMatchingTsid,
            None => SelectionKind::AllTs,
        };
        let ensemble_id = self.param(args, "EnsembleID")?;
        let position = self.param(args, "TSPosition")?;
        let specified = self.param(args, "SpecifiedTSID")?;

        Ok(SelectionSpec::from_params(
            kind,
            tsid.as_deref(),
            ensemble_id.as_deref(),
            position.as_deref(),
            specified.as_deref(),
        )?)
    }

    /// Resolve the command's selection and apply its not-found policy
    ///
    /// Under `Fail` this returns an error before the command has changed
    /// anything.
    pub fn resolve_selection(&mut self, args: &ParsedCommand) -> CmdResult<SelectionResult> {
        let policy = self.not_found_policy(args)?;
        let spec = self.selection_spec(args)?;
        let description = spec.to_string();
        let result = self.resolve(spec)?;

        if !result.duplicates().is_empty() && policy != NotFoundPolicy::Ignore {
            let positions: Vec<String> = result.duplicates().iter().map(|p| p.to_string()).collect();
            self.warn(
                format!("Positions listed more than once: {}", positions.join(", ")),
                "Each time series is processed once; remove the repeated positions.",
            );
        }
        policy.apply(&result, &description, &mut *self.status)?;
        Ok(result)
    }
}

/// Trait for command implementations
///
/// A command is validated once its parameters are known (Initialize) and
/// run against the processor later (Run). Validation must not depend on
/// processor state.
pub trait Command: Send + Sync {
    /// Get the command name
    fn name(&self) -> &str;

    /// Execute the command
    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult;

    /// Get help text for this command
    fn help(&self) -> &str {
        "No help available."
    }

    /// Get parameter definitions for validation and help
    fn params(&self) -> &[ParamDef] {
        &[]
    }

    /// Checks beyond the parameter definitions
    fn validate(&self, _args: &ParsedCommand) -> CmdResult {
        Ok(())
    }

    /// Canonical text for the command, parameters in definition order
    fn describe(&self, args: &ParsedCommand) -> String {
        let defs = self.params();
        let mut out = ParsedCommand::new(self.name());
        for def in defs {
            if let Some(value) = args.get(def.name) {
                out.params.push((def.name.to_string(), value.to_string()));
            }
        }
        for (name, value) in &args.params {
            if !defs.iter().any(|d| d.name == name) {
                out.params.push((name.clone(), value.clone()));
            }
        }
        out.to_string()
    }

    /// Get list of command aliases
    fn aliases(&self) -> &[&str] {
        &[]
    }
}

/// Check parameters against their definitions
///
/// Unknown parameters are warnings; missing required parameters and
/// malformed values are failures. Values containing `${` are checked at
/// Run time instead, after expansion.
pub fn validate_params(defs: &[ParamDef], args: &ParsedCommand) -> Vec<CmdError> {
    let mut problems = Vec::new();

    for (name, _) in &args.params {
        if !defs.iter().any(|d| d.name == name) {
            problems.push(CmdError::UnknownParameter(name.clone()));
        }
    }

    for def in defs {
        match args.get(def.name) {
            None => {
                if def.required {
                    problems.push(CmdError::MissingParameter(def.name.to_string()));
                }
            }
            Some(value) if value.trim().is_empty() => {
                if def.required {
                    problems.push(CmdError::MissingParameter(def.name.to_string()));
                }
            }
            Some(value) if PropertyStore::has_reference(value) => {}
            Some(value) => {
                if let Err(reason) = def.kind.check(value) {
                    problems.push(CmdError::syntax(def.name, reason));
                }
            }
        }
    }

    problems
}

/// Registry mapping command names to implementations
pub struct CommandRegistry {
    /// Commands indexed by name
    commands: AHashMap<String, Arc<dyn Command>>,
    /// Aliases mapping alias -> command name
    aliases: AHashMap<String, String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: AHashMap::new(),
            aliases: AHashMap::new(),
        }
    }

    /// Create a registry with all built-in commands registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::commands::register_all(&mut registry);
        registry
    }

    /// Register a command
    ///
    /// Also registers any aliases defined by the command.
    pub fn register<C: Command + 'static>(&mut self, cmd: C) {
        self.register_arc(Arc::new(cmd));
    }

    /// Register a command with an Arc
    pub fn register_arc(&mut self, cmd: Arc<dyn Command>) {
        let name = cmd.name().to_string();
        for alias in cmd.aliases() {
            self.aliases.insert(alias.to_string(), name.clone());
        }
        self.commands.insert(name, cmd);
    }

    /// Look up a command by name or alias
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        if let Some(cmd) = self.commands.get(name) {
            return Some(cmd.clone());
        }
        self.aliases
            .get(name)
            .and_then(|real_name| self.commands.get(real_name))
            .cloned()
    }

    /// Check if a command exists
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Get all command names, sorted (not including aliases)
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove a command
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Command>> {
        self.aliases.retain(|_, v| v != name);
        self.commands.remove(name)
    }
}
