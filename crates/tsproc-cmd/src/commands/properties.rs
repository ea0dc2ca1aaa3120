//! Property commands: SetProperty, SetInputPeriod, SetOutputPeriod

use tsproc_processor::{PROP_INPUT_END, PROP_INPUT_START, PROP_OUTPUT_END, PROP_OUTPUT_START};
use tsproc_props::{PropType, PropValue, PropertyStore};

use crate::args::{ParamDef, ParamKind, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry};
use crate::error::{CmdError, CmdResult};

/// Register property commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(SetPropertyCommand);
    registry.register(PeriodCommand {
        name: "SetInputPeriod",
        start: PROP_INPUT_START,
        end: PROP_INPUT_END,
        params: INPUT_PERIOD_PARAMS,
    });
    registry.register(PeriodCommand {
        name: "SetOutputPeriod",
        start: PROP_OUTPUT_START,
        end: PROP_OUTPUT_END,
        params: OUTPUT_PERIOD_PARAMS,
    });
}

// ============================================================================
// SetProperty command
// ============================================================================

struct SetPropertyCommand;

const SET_PROPERTY_PARAMS: &[ParamDef] = &[
    ParamDef::required("PropertyName", ParamKind::String),
    ParamDef::optional("PropertyType", ParamKind::PropType),
    ParamDef::optional("PropertyValue", ParamKind::String),
];

impl Command for SetPropertyCommand {
    fn name(&self) -> &str {
        "SetProperty"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "SetProperty" sets a processor property that later commands can
    reference as ${Name}.

USAGE

    SetProperty(PropertyName=Name, [PropertyType=String|Integer|Double|Boolean|DateTime],
                PropertyValue=Value)

EXAMPLES

    SetProperty(PropertyName=Scenario,PropertyValue=Wet)
    SetProperty(PropertyName=Factor,PropertyType=Double,PropertyValue=1.5)
    SetProperty(PropertyName=Start,PropertyType=DateTime,PropertyValue=OutputStart)
"#
    }

    fn params(&self) -> &[ParamDef] {
        SET_PROPERTY_PARAMS
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        let prop_type = match args.get("PropertyType") {
            Some(text) if !PropertyStore::has_reference(text) && !text.trim().is_empty() => {
                text.parse::<PropType>()
                    .map_err(|e| CmdError::syntax("PropertyType", e.to_string()))?
            }
            _ => return Ok(()),
        };
        let value = args.get_or("PropertyValue", "");
        if PropertyStore::has_reference(value) {
            return Ok(());
        }
        if prop_type == PropType::DateTime {
            return ParamKind::DateTime
                .check(value)
                .map_err(|reason| CmdError::syntax("PropertyValue", reason));
        }
        PropValue::parse_typed(prop_type, value)
            .map(|_| ())
            .map_err(|e| CmdError::syntax("PropertyValue", e.to_string()))
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let name = ctx.require(args, "PropertyName")?;
        let prop_type = ctx
            .param_parsed::<PropType>(args, "PropertyType")?
            .unwrap_or(PropType::String);

        let value = if prop_type == PropType::DateTime {
            let dt = ctx
                .param_datetime(args, "PropertyValue")?
                .ok_or_else(|| CmdError::MissingParameter("PropertyValue".to_string()))?;
            PropValue::DateTime(dt)
        } else {
            let text = ctx.param(args, "PropertyValue")?.unwrap_or_default();
            PropValue::parse_typed(prop_type, &text)
                .map_err(|e| CmdError::syntax("PropertyValue", e.to_string()))?
        };

        ctx.print(&format!(" {} = {}", name, value));
        ctx.set_property(name.trim(), value)?;
        Ok(())
    }
}

// ============================================================================
// SetInputPeriod / SetOutputPeriod commands
// ============================================================================

/// Sets a pair of period-bound properties
struct PeriodCommand {
    name: &'static str,
    start: &'static str,
    end: &'static str,
    params: &'static [ParamDef],
}

const INPUT_PERIOD_PARAMS: &[ParamDef] = &[
    ParamDef::optional("InputStart", ParamKind::DateTime),
    ParamDef::optional("InputEnd", ParamKind::DateTime),
];

const OUTPUT_PERIOD_PARAMS: &[ParamDef] = &[
    ParamDef::optional("OutputStart", ParamKind::DateTime),
    ParamDef::optional("OutputEnd", ParamKind::DateTime),
];

impl Command for PeriodCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    Sets the global period bounds. Values may be literal date/times
    (YYYY, YYYY-MM, YYYY-MM-DD, YYYY-MM-DD hh, YYYY-MM-DD hh:mm), ${Name}
    references, or CurrentToMinute, CurrentToHour, CurrentToDay.

USAGE

    SetInputPeriod([InputStart=...], [InputEnd=...])
    SetOutputPeriod([OutputStart=...], [OutputEnd=...])
"#
    }

    fn params(&self) -> &[ParamDef] {
        self.params
    }

    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        let literal = |name: &str| {
            args.get(name)
                .filter(|v| !PropertyStore::has_reference(v))
                .and_then(PropValue::parse_datetime)
        };
        if let (Some(start), Some(end)) = (literal(self.start), literal(self.end)) {
            if end < start {
                return Err(CmdError::syntax(
                    self.end,
                    format!("{} is before {} {}", end, self.start, start),
                ));
            }
        }
        Ok(())
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let start = ctx.param_datetime(args, self.start)?;
        let end = ctx.param_datetime(args, self.end)?;
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(CmdError::syntax(
                    self.end,
                    format!("{} is before {} {}", end, self.start, start),
                ));
            }
        }

        for (name, value) in [(self.start, start), (self.end, end)] {
            if let Some(dt) = value {
                ctx.set_property(name, PropValue::DateTime(dt))?;
                ctx.print(&format!(" {} = {}", name, PropValue::DateTime(dt)));
            }
        }
        Ok(())
    }
}
