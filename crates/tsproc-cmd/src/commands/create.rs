//! Commands that add time series: NewTimeSeries, Copy

use chrono::NaiveDateTime;
use tsproc_processor::{PROP_OUTPUT_END, PROP_OUTPUT_START};
use tsproc_props::PropertyStore;
use tsproc_select::{Pattern, SelectionSpec};
use tsproc_series::{TimeSeries, TsIdent};

use super::IF_NOT_FOUND;
use crate::args::{ParamDef, ParamKind, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry};
use crate::error::{CmdError, CmdResult};

/// Register creation commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(NewTimeSeriesCommand);
    registry.register(CopyCommand);
}

/// Parse identifier text, reporting errors against a parameter
fn parse_ident(param: &str, text: &str) -> CmdResult<TsIdent> {
    TsIdent::parse(text.trim()).map_err(|e| CmdError::syntax(param, e.to_string()))
}

/// Check a literal identifier during validation
fn validate_ident(args: &ParsedCommand, param: &str) -> CmdResult {
    match args.get(param) {
        Some(text) if !PropertyStore::has_reference(text) => parse_ident(param, text).map(|_| ()),
        _ => Ok(()),
    }
}

// ============================================================================
// NewTimeSeries command
// ============================================================================

struct NewTimeSeriesCommand;

/// Largest number of values a new time series may hold
const MAX_NEW_VALUES: usize = 10_000_000;

const NEW_PARAMS: &[ParamDef] = &[
    ParamDef::optional("Alias", ParamKind::String),
    ParamDef::required("NewTSID", ParamKind::String),
    ParamDef::optional("Description", ParamKind::String),
    ParamDef::optional("Units", ParamKind::String),
    ParamDef::optional("SetStart", ParamKind::DateTime),
    ParamDef::optional("SetEnd", ParamKind::DateTime),
    ParamDef::optional("InitialValue", ParamKind::Double),
    ParamDef::optional("EnsembleID", ParamKind::String),
];

impl NewTimeSeriesCommand {
    /// Explicit bound, else the global output period bound
    fn bound(
        ctx: &mut CommandContext<'_>,
        args: &ParsedCommand,
        param: &str,
        fallback: &str,
    ) -> CmdResult<Option<NaiveDateTime>> {
        if let Some(dt) = ctx.param_datetime(args, param)? {
            return Ok(Some(dt));
        }
        Ok(ctx.property(fallback)?.and_then(|v| v.as_datetime()))
    }
}

/// Values for a new period, refusing sizes the process cannot hold
fn filled(count: usize, initial: Option<f64>) -> CmdResult<Vec<Option<f64>>> {
    if count > MAX_NEW_VALUES {
        return Err(CmdError::Execution(format!(
            "period holds {} values, more than the limit of {}",
            count, MAX_NEW_VALUES
        )));
    }
    let mut values = Vec::new();
    values
        .try_reserve_exact(count)
        .map_err(|e| CmdError::Execution(format!("cannot allocate {} values: {}", count, e)))?;
    values.resize(count, initial);
    Ok(values)
}

impl Command for NewTimeSeriesCommand {
    fn name(&self) -> &str {
        "NewTimeSeries"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "NewTimeSeries" creates a time series filled with a constant value.
    The period defaults to the output period.

USAGE

    NewTimeSeries(Alias=..., NewTSID=Location.Source.Type.Interval[.Scenario],
                  [Description=...], [Units=...], [SetStart=...], [SetEnd=...],
                  [InitialValue=...], [EnsembleID=...])

EXAMPLES

    NewTimeSeries(Alias=Flow,NewTSID="Gage1.USGS.Streamflow.Day",InitialValue=0)
"#
    }

    fn params(&self) -> &[ParamDef] {
        NEW_PARAMS
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        validate_ident(args, "NewTSID")
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let ident = parse_ident("NewTSID", &ctx.require(args, "NewTSID")?)?;
        let alias = ctx.param(args, "Alias")?.unwrap_or_default();
        let description = ctx.param(args, "Description")?.unwrap_or_default();
        let units = ctx.param(args, "Units")?.unwrap_or_default();
        let ensemble_id = ctx.param(args, "EnsembleID")?.unwrap_or_default();
        let initial = ctx.param_parsed::<f64>(args, "InitialValue")?;
        let start = Self::bound(ctx, args, "SetStart", PROP_OUTPUT_START)?;
        let end = Self::bound(ctx, args, "SetEnd", PROP_OUTPUT_END)?;

        let mut ts = TimeSeries::new(ident)
            .with_alias(alias.trim())
            .with_description(description)
            .with_ensemble(ensemble_id.trim());
        ts.units = units;

        match (start, end) {
            (Some(start), Some(end)) => {
                let interval = ts.ident.time_interval()?;
                let count = interval.count_between(start, end);
                ts = ts.with_data(start, end, filled(count, initial)?)?;
            }
            _ => ctx.warn(
                "Period is not set; the time series has no data.",
                "Specify SetStart and SetEnd, or run SetOutputPeriod first.",
            ),
        }

        let name = ts.display_name();
        let index = ctx.append_entry(ts)?;
        ctx.print(&format!(" Created [{}] {}", index + 1, name));
        Ok(())
    }
}

// ============================================================================
// Copy command
// ============================================================================

struct CopyCommand;

const COPY_PARAMS: &[ParamDef] = &[
    ParamDef::required("TSID", ParamKind::String),
    ParamDef::required("NewTSID", ParamKind::String),
    ParamDef::optional("Alias", ParamKind::String),
    IF_NOT_FOUND,
];

impl Command for CopyCommand {
    fn name(&self) -> &str {
        "Copy"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "Copy" appends a copy of a time series under a new identifier.
    When several time series match TSID, the last one is copied.

USAGE

    Copy(TSID=..., NewTSID=..., [Alias=...], [IfNotFound=Ignore|Warn|Fail])
"#
    }

    fn params(&self) -> &[ParamDef] {
        COPY_PARAMS
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        validate_ident(args, "NewTSID")
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let policy = ctx.not_found_policy(args)?;
        let tsid = ctx.require(args, "TSID")?;
        let ident = parse_ident("NewTSID", &ctx.require(args, "NewTSID")?)?;
        let alias = ctx.param(args, "Alias")?.unwrap_or_default();

        let spec = SelectionSpec::LastMatching(Pattern::new(&tsid));
        let description = spec.to_string();
        let result = ctx.resolve(spec)?;
        policy.apply(&result, &description, ctx.status())?;
        let Some(&index) = result.indices().first() else {
            return Ok(());
        };

        let mut copy = ctx.entry(index)?;
        copy.ident = ident;
        copy.alias = None;
        copy.ensemble_id = None;
        copy.selected = false;
        let copy = copy.with_alias(alias.trim());

        let name = copy.display_name();
        let new_index = ctx.append_entry(copy)?;
        ctx.print(&format!(" Copied [{}] to [{}] {}", index + 1, new_index + 1, name));
        Ok(())
    }
}
