//! Command implementations
//!
//! This module contains all built-in command implementations organized by category.

pub mod control;
pub mod create;
pub mod properties;
pub mod selecting;
pub mod transform;

use tsproc_props::PropertyStore;
use tsproc_select::{SelectionKind, SelectionSpec};

use crate::args::{ParamDef, ParamKind, ParsedCommand};
use crate::command::CommandRegistry;
use crate::error::CmdResult;

pub use transform::{AddConstantOp, FillConstantOp, ScaleOp, SeriesOperation};

/// Register all built-in commands with the registry
pub fn register_all(registry: &mut CommandRegistry) {
    selecting::register(registry);
    properties::register(registry);
    create::register(registry);
    transform::register(registry);
    control::register(registry);
}

pub(crate) const TS_LIST: ParamDef = ParamDef::optional("TSList", ParamKind::TsList);
pub(crate) const TSID: ParamDef = ParamDef::optional("TSID", ParamKind::String);
pub(crate) const ENSEMBLE_ID: ParamDef = ParamDef::optional("EnsembleID", ParamKind::String);
pub(crate) const TS_POSITION: ParamDef = ParamDef::optional("TSPosition", ParamKind::Positions);
pub(crate) const SPECIFIED_TSID: ParamDef = ParamDef::optional("SpecifiedTSID", ParamKind::String);
pub(crate) const IF_NOT_FOUND: ParamDef = ParamDef::optional("IfNotFound", ParamKind::Policy);

/// Check that `TSList` has the companion parameter its kind needs
///
/// Skipped when any of the values is only known after expansion.
pub(crate) fn validate_selection(args: &ParsedCommand) -> CmdResult {
    let names = ["TSList", "TSID", "EnsembleID", "TSPosition", "SpecifiedTSID"];
    if names
        .iter()
        .filter_map(|n| args.get(n))
        .any(PropertyStore::has_reference)
    {
        return Ok(());
    }

    let kind = match args.get("TSList").filter(|v| !v.trim().is_empty()) {
        Some(text) => text.parse()?,
        None if args.contains("TSID") => SelectionKind::AllMatchingTsid,
        None => SelectionKind::AllTs,
    };
    SelectionSpec::from_params(
        kind,
        args.get("TSID"),
        args.get("EnsembleID"),
        args.get("TSPosition"),
        args.get("SpecifiedTSID"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmdError;

    #[test]
    fn test_builtins_registered() {
        let registry = CommandRegistry::with_builtins();
        for name in [
            "SelectTimeSeries",
            "DeselectTimeSeries",
            "Free",
            "SetProperty",
            "SetInputPeriod",
            "SetOutputPeriod",
            "NewTimeSeries",
            "Copy",
            "AddConstant",
            "Scale",
            "FillConstant",
            "Message",
        ] {
            assert!(registry.contains(name), "{} not registered", name);
        }
    }

    #[test]
    fn test_validate_selection() {
        let ok = ParsedCommand::new("Free").with_param("TSList", "AllTS");
        assert!(validate_selection(&ok).is_ok());

        let missing = ParsedCommand::new("Free").with_param("TSList", "EnsembleID");
        assert!(matches!(validate_selection(&missing), Err(CmdError::Select(_))));

        let deferred = ParsedCommand::new("Free")
            .with_param("TSList", "EnsembleID")
            .with_param("EnsembleID", "${Ens}");
        assert!(validate_selection(&deferred).is_ok());

        let bad_kind = ParsedCommand::new("Free").with_param("TSList", "Everything");
        assert!(validate_selection(&bad_kind).is_err());
    }
}
