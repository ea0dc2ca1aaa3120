//! Selection commands: SelectTimeSeries, DeselectTimeSeries, Free

use tsproc_props::PropValue;
use tsproc_select::SelectionSpec;

use super::{validate_selection, ENSEMBLE_ID, IF_NOT_FOUND, SPECIFIED_TSID, TSID, TS_LIST, TS_POSITION};
use crate::args::{ParamDef, ParamKind, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry};
use crate::error::CmdResult;

/// Register selection commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(SelectCommand);
    registry.register(DeselectCommand);
    registry.register(FreeCommand);
}

/// Set the selection flag on the resolved entries, optionally resetting
/// every entry first, and publish the selected count
fn apply_selection(
    ctx: &mut CommandContext<'_>,
    args: &ParsedCommand,
    selected: bool,
    reset_param: &str,
) -> CmdResult {
    let result = ctx.resolve_selection(args)?;
    let reset_first = ctx.param_bool(args, reset_param, false)?;
    let count_property = ctx.param_strict(args, "SelectCountProperty")?;

    if reset_first {
        for index in 0..ctx.table_size()? {
            ctx.set_selected(index, !selected)?;
        }
    }
    for &index in result.indices() {
        ctx.set_selected(index, selected)?;
    }

    let total = ctx.resolve(SelectionSpec::Selected)?.len();
    if let Some(name) = count_property.filter(|n| !n.trim().is_empty()) {
        ctx.set_property(name.trim(), PropValue::Int(total as i64))?;
    }
    ctx.print(&format!(
        " {} {} time series, {} now selected",
        if selected { "Selected" } else { "Deselected" },
        result.len(),
        total
    ));
    Ok(())
}

// ============================================================================
// SelectTimeSeries command
// ============================================================================

struct SelectCommand;

const SELECT_PARAMS: &[ParamDef] = &[
    TS_LIST,
    TSID,
    ENSEMBLE_ID,
    TS_POSITION,
    SPECIFIED_TSID,
    ParamDef::optional("DeselectAllFirst", ParamKind::Boolean),
    ParamDef::optional("SelectCountProperty", ParamKind::String),
    IF_NOT_FOUND,
];

impl Command for SelectCommand {
    fn name(&self) -> &str {
        "SelectTimeSeries"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "SelectTimeSeries" sets the selection flag on a list of time series.

USAGE

    SelectTimeSeries(TSList=..., [TSID=...], [DeselectAllFirst=True|False],
                     [SelectCountProperty=Name], [IfNotFound=Ignore|Warn|Fail])

EXAMPLES

    SelectTimeSeries(TSList=AllMatchingTSID,TSID="*.USGS.*",DeselectAllFirst=True)
    SelectTimeSeries(TSList=TSPosition,TSPosition="1,3-4")
"#
    }

    fn params(&self) -> &[ParamDef] {
        SELECT_PARAMS
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        validate_selection(args)
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        apply_selection(ctx, args, true, "DeselectAllFirst")
    }
}

// ============================================================================
// DeselectTimeSeries command
// ============================================================================

struct DeselectCommand;

const DESELECT_PARAMS: &[ParamDef] = &[
    TS_LIST,
    TSID,
    ENSEMBLE_ID,
    TS_POSITION,
    SPECIFIED_TSID,
    ParamDef::optional("SelectAllFirst", ParamKind::Boolean),
    ParamDef::optional("SelectCountProperty", ParamKind::String),
    IF_NOT_FOUND,
];

impl Command for DeselectCommand {
    fn name(&self) -> &str {
        "DeselectTimeSeries"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "DeselectTimeSeries" clears the selection flag on a list of time series.

USAGE

    DeselectTimeSeries(TSList=..., [TSID=...], [SelectAllFirst=True|False],
                       [SelectCountProperty=Name], [IfNotFound=Ignore|Warn|Fail])
"#
    }

    fn params(&self) -> &[ParamDef] {
        DESELECT_PARAMS
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        validate_selection(args)
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        apply_selection(ctx, args, false, "SelectAllFirst")
    }
}

// ============================================================================
// Free command
// ============================================================================

struct FreeCommand;

const FREE_PARAMS: &[ParamDef] = &[
    TS_LIST,
    TSID,
    ENSEMBLE_ID,
    TS_POSITION,
    SPECIFIED_TSID,
    IF_NOT_FOUND,
];

impl Command for FreeCommand {
    fn name(&self) -> &str {
        "Free"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "Free" removes time series from the results.

USAGE

    Free(TSList=..., [TSID=...], [IfNotFound=Ignore|Warn|Fail])

NOTES

    Entries after a removed one move up; later commands resolve their
    lists again and see the new positions.
"#
    }

    fn params(&self) -> &[ParamDef] {
        FREE_PARAMS
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        validate_selection(args)
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let result = ctx.resolve_selection(args)?;

        // Highest index first so the remaining indices stay valid
        let mut freed = 0;
        for index in result.indices_descending() {
            let ts = ctx.remove_entry(index)?;
            log::debug!("freed [{}] {}", index, ts.display_name());
            freed += 1;
        }
        ctx.print(&format!(" Freed {} time series", freed));
        Ok(())
    }
}
