//! Transform commands: AddConstant, Scale, FillConstant
//!
//! The commands only resolve their list and hand each entry to a
//! [`SeriesOperation`]; the arithmetic lives in the operation.

use tsproc_select::SelectionResult;
use tsproc_series::TimeSeries;

use super::{validate_selection, ENSEMBLE_ID, IF_NOT_FOUND, SPECIFIED_TSID, TSID, TS_LIST, TS_POSITION};
use crate::args::{ParamDef, ParamKind, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry};
use crate::error::{CmdError, CmdResult};

/// Register transform commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(TransformCommand {
        name: "AddConstant",
        value_param: "ConstantValue",
        params: ADD_CONSTANT_PARAMS,
        help: "\nDESCRIPTION\n\n    \"AddConstant\" adds a constant to every non-missing value.\n\nUSAGE\n\n    AddConstant(TSList=..., ConstantValue=...)\n",
        build: |v| Box::new(AddConstantOp(v)),
    });
    registry.register(TransformCommand {
        name: "Scale",
        value_param: "ScaleValue",
        params: SCALE_PARAMS,
        help: "\nDESCRIPTION\n\n    \"Scale\" multiplies every non-missing value by a factor.\n\nUSAGE\n\n    Scale(TSList=..., ScaleValue=...)\n",
        build: |v| Box::new(ScaleOp(v)),
    });
    registry.register(TransformCommand {
        name: "FillConstant",
        value_param: "ConstantValue",
        params: FILL_CONSTANT_PARAMS,
        help: "\nDESCRIPTION\n\n    \"FillConstant\" replaces missing values with a constant.\n\nUSAGE\n\n    FillConstant(TSList=..., ConstantValue=...)\n",
        build: |v| Box::new(FillConstantOp(v)),
    });
}

/// Operation applied to one time series in place
pub trait SeriesOperation: Send + Sync {
    /// Operation name for messages
    fn name(&self) -> &str;

    /// Apply the operation
    fn apply(&self, ts: &mut TimeSeries) -> CmdResult;
}

/// Add a constant to non-missing values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddConstantOp(pub f64);

impl SeriesOperation for AddConstantOp {
    fn name(&self) -> &str {
        "add constant"
    }

    fn apply(&self, ts: &mut TimeSeries) -> CmdResult {
        for v in ts.values.iter_mut().flatten() {
            *v += self.0;
        }
        Ok(())
    }
}

/// Multiply non-missing values by a factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOp(pub f64);

impl SeriesOperation for ScaleOp {
    fn name(&self) -> &str {
        "scale"
    }

    fn apply(&self, ts: &mut TimeSeries) -> CmdResult {
        for v in ts.values.iter_mut().flatten() {
            *v *= self.0;
        }
        Ok(())
    }
}

/// Replace missing values with a constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillConstantOp(pub f64);

impl SeriesOperation for FillConstantOp {
    fn name(&self) -> &str {
        "fill constant"
    }

    fn apply(&self, ts: &mut TimeSeries) -> CmdResult {
        for v in ts.values.iter_mut().filter(|v| v.is_none()) {
            *v = Some(self.0);
        }
        Ok(())
    }
}

/// Apply an operation to every resolved entry, in result order
///
/// Each entry is fetched, transformed and written back through the
/// processor, so an operation error leaves that entry unchanged.
pub fn apply_operation(
    ctx: &mut CommandContext<'_>,
    result: &SelectionResult,
    op: &dyn SeriesOperation,
) -> CmdResult<usize> {
    let mut count = 0;
    for &index in result.indices() {
        let mut ts = ctx.entry(index)?;
        op.apply(&mut ts)?;
        ctx.replace_entry(index, ts)?;
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// Transform command
// ============================================================================

/// Resolves a list and applies one operation built from a numeric parameter
struct TransformCommand {
    name: &'static str,
    value_param: &'static str,
    params: &'static [ParamDef],
    help: &'static str,
    build: fn(f64) -> Box<dyn SeriesOperation>,
}

const ADD_CONSTANT_PARAMS: &[ParamDef] = &[
    TS_LIST,
    TSID,
    ENSEMBLE_ID,
    TS_POSITION,
    SPECIFIED_TSID,
    ParamDef::required("ConstantValue", ParamKind::Double),
    IF_NOT_FOUND,
];

const SCALE_PARAMS: &[ParamDef] = &[
    TS_LIST,
    TSID,
    ENSEMBLE_ID,
    TS_POSITION,
    SPECIFIED_TSID,
    ParamDef::required("ScaleValue", ParamKind::Double),
    IF_NOT_FOUND,
];

const FILL_CONSTANT_PARAMS: &[ParamDef] = &[
    TS_LIST,
    TSID,
    ENSEMBLE_ID,
    TS_POSITION,
    SPECIFIED_TSID,
    ParamDef::required("ConstantValue", ParamKind::Double),
    IF_NOT_FOUND,
];

impl Command for TransformCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn help(&self) -> &str {
        self.help
    }

    fn params(&self) -> &[ParamDef] {
        self.params
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        validate_selection(args)
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let value = ctx
            .param_parsed::<f64>(args, self.value_param)?
            .ok_or_else(|| CmdError::MissingParameter(self.value_param.to_string()))?;
        let op = (self.build)(value);

        let result = ctx.resolve_selection(args)?;
        let count = apply_operation(ctx, &result, op.as_ref())?;
        ctx.print(&format!(" Applied {} {} to {} time series", op.name(), value, count));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::CommandStatus;
    use tsproc_processor::Processor;
    use tsproc_props::PropValue;
    use tsproc_series::TsIdent;

    fn series(loc: &str, values: Vec<Option<f64>>) -> TimeSeries {
        let start = PropValue::parse_datetime("2020-01-01").unwrap();
        let end = PropValue::parse_datetime("2020-01-03").unwrap();
        TimeSeries::new(TsIdent::new(loc, "USGS", "Streamflow", "Day"))
            .with_data(start, end, values)
            .unwrap()
    }

    fn processor() -> Processor {
        let mut p = Processor::new();
        p.table_mut().append(series("A", vec![Some(1.0), None, Some(3.0)])).unwrap();
        p.table_mut().append(series("B", vec![Some(10.0), Some(20.0), None])).unwrap();
        p
    }

    fn run_named(p: &mut Processor, text: &str) -> CmdResult {
        let args = crate::parser::parse_command(text).unwrap();
        let registry = CommandRegistry::with_builtins();
        let command = registry.get(&args.name).unwrap();
        let mut status = CommandStatus::new();
        let mut ctx = CommandContext::new(p, &mut status).with_quiet(true);
        command.run(&mut ctx, &args)
    }

    #[test]
    fn test_operations() {
        let mut ts = series("A", vec![Some(1.0), None, Some(3.0)]);
        AddConstantOp(1.0).apply(&mut ts).unwrap();
        assert_eq!(ts.values, vec![Some(2.0), None, Some(4.0)]);
        ScaleOp(2.0).apply(&mut ts).unwrap();
        assert_eq!(ts.values, vec![Some(4.0), None, Some(8.0)]);
        FillConstantOp(0.0).apply(&mut ts).unwrap();
        assert_eq!(ts.values, vec![Some(4.0), Some(0.0), Some(8.0)]);
    }

    #[test]
    fn test_scale_selected_entries() {
        let mut p = processor();
        run_named(&mut p, "Scale(TSList=AllMatchingTSID,TSID=B*,ScaleValue=0.5)").unwrap();
        assert_eq!(p.table().get(0).unwrap().values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(p.table().get(1).unwrap().values, vec![Some(5.0), Some(10.0), None]);
    }

    #[test]
    fn test_fill_all() {
        let mut p = processor();
        run_named(&mut p, "FillConstant(TSList=AllTS,ConstantValue=-1)").unwrap();
        assert!(p.table().iter().all(|ts| ts.missing_count() == 0));
    }

    #[test]
    fn test_value_from_property() {
        let mut p = processor();
        p.props_mut().set("Offset", PropValue::Float(2.5)).unwrap();
        run_named(&mut p, "AddConstant(TSList=TSPosition,TSPosition=1,ConstantValue=${Offset})")
            .unwrap();
        assert_eq!(p.table().get(0).unwrap().values, vec![Some(3.5), None, Some(5.5)]);
    }
}
