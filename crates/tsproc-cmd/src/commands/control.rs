//! Control commands: Message

use crate::args::{ParamDef, ParamKind, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry};
use crate::error::CmdResult;
use crate::status::{CommandPhase, Severity};

/// Register control commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(MessageCommand);
}

// ============================================================================
// Message command
// ============================================================================

struct MessageCommand;

const MESSAGE_PARAMS: &[ParamDef] = &[
    ParamDef::required("Message", ParamKind::String),
    ParamDef::optional(
        "CommandStatus",
        ParamKind::Choice(&["Success", "Warning", "Failure"]),
    ),
];

impl Command for MessageCommand {
    fn name(&self) -> &str {
        "Message"
    }

    fn help(&self) -> &str {
        r#"
DESCRIPTION

    "Message" prints a message and, with CommandStatus=Warning or Failure,
    records it in the command status.

USAGE

    Message(Message="...", [CommandStatus=Success|Warning|Failure])

EXAMPLES

    Message(Message="Processing ${Scenario}")
    Message(Message="Check inputs",CommandStatus=Warning)
"#
    }

    fn params(&self) -> &[ParamDef] {
        MESSAGE_PARAMS
    }

    fn run(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult {
        let message = ctx.param(args, "Message")?.unwrap_or_default();
        let severity = ctx
            .param_parsed::<Severity>(args, "CommandStatus")?
            .unwrap_or_default();

        ctx.print(&message);
        if severity > Severity::Success {
            ctx.status()
                .add(CommandPhase::Run, severity, message, "See the message text.");
        }
        Ok(())
    }
}
