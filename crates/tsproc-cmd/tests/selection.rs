//! Selection resolution and expansion through the public API

use tsproc_cmd::{
    CommandContext, CommandPhase, CommandStatus, NotFoundPolicy, ParsedCommand, Severity,
};
use tsproc_processor::{Processor, Request, Response};
use tsproc_props::PropValue;
use tsproc_select::{resolve, PositionList, SelectionSpec};
use tsproc_series::{ResultTable, TimeSeries, TsIdent};

fn table(aliases: &[&str]) -> ResultTable {
    let mut table = ResultTable::new();
    for (i, alias) in aliases.iter().enumerate() {
        let loc = format!("Loc{}", i + 1);
        table
            .append(TimeSeries::new(TsIdent::new(loc, "USGS", "Streamflow", "Day")).with_alias(*alias))
            .unwrap();
    }
    table
}

fn positions(text: &str) -> SelectionSpec {
    SelectionSpec::Positions(PositionList::parse(text).unwrap())
}

#[test]
fn resolve_is_idempotent_and_read_only() {
    let table = table(&["A1", "B1", "A2", "C1"]);
    let specs = [
        SelectionSpec::AllEntries,
        SelectionSpec::all_matching("A*"),
        SelectionSpec::Selected,
        positions("1,3-4"),
        SelectionSpec::Explicit(vec!["C1".to_string(), "A1".to_string()]),
    ];
    for spec in &specs {
        let before: Vec<TimeSeries> = table.iter().cloned().collect();
        let first = resolve(spec, &table);
        let second = resolve(spec, &table);
        assert_eq!(first, second, "{}", spec);
        let after: Vec<TimeSeries> = table.iter().cloned().collect();
        assert_eq!(before, after);
    }
}

#[test]
fn position_list_ranges() {
    let table = table(&["a", "b", "c", "d", "e", "f"]);
    let result = resolve(&positions("2,4-5"), &table);
    assert_eq!(result.indices(), &[1, 3, 4]);
    assert_eq!(result.not_found_count(), 0);
}

#[test]
fn position_out_of_range_is_not_found() {
    let table = table(&["a", "b", "c", "d", "e", "f"]);
    let result = resolve(&positions("9"), &table);
    assert!(result.is_empty());
    assert_eq!(result.not_found_count(), 1);
}

#[test]
fn pattern_keeps_table_order_and_case() {
    let table = table(&["A1", "B1", "A2"]);
    let result = resolve(&SelectionSpec::all_matching("A*"), &table);
    let names: Vec<String> = result
        .entries(&table)
        .iter()
        .map(|ts| ts.display_name())
        .collect();
    assert_eq!(names, vec!["A1", "A2"]);

    assert!(resolve(&SelectionSpec::all_matching("a*"), &table).is_empty());
}

#[test]
fn resolution_reflects_current_table() {
    let mut processor = Processor::new();
    *processor.table_mut() = table(&["A1", "B1", "A2"]);

    let spec = SelectionSpec::all_matching("A*");
    assert_eq!(processor.resolve(&spec).indices(), &[0, 2]);

    processor.request(Request::RemoveEntry { index: 0 }).unwrap();
    assert_eq!(processor.resolve(&spec).indices(), &[1]);
}

#[test]
fn expansion_of_undefined_and_defined_property() {
    let mut processor = Processor::new();
    let args = ParsedCommand::new("Test").with_param("Text", "Value=${X}");

    let mut status = CommandStatus::new();
    {
        let mut ctx = CommandContext::new(&mut processor, &mut status);
        assert_eq!(ctx.param(&args, "Text").unwrap().as_deref(), Some("Value=${X}"));
    }
    assert_eq!(status.records().len(), 1);
    assert_eq!(status.rollup(CommandPhase::Run), Severity::Warning);

    processor.props_mut().set("X", PropValue::from("9")).unwrap();
    let response = processor
        .request(Request::ExpandText {
            text: "Value=${X}".to_string(),
        })
        .unwrap();
    match response {
        Response::Expanded(e) => {
            assert_eq!(e.text, "Value=9");
            assert!(e.is_complete());
        }
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn policy_table_for_every_kind() {
    let selections: &[&[(&str, &str)]] = &[
        &[("TSList", "AllTS")],
        &[("TSList", "AllMatchingTSID"), ("TSID", "Z*")],
        &[("TSList", "FirstMatchingTSID"), ("TSID", "Z*")],
        &[("TSList", "LastMatchingTSID"), ("TSID", "Z*")],
        &[("TSList", "SelectedTS")],
        &[("TSList", "EnsembleID"), ("EnsembleID", "Missing")],
        &[("TSList", "TSPosition"), ("TSPosition", "5")],
        &[("TSList", "SpecifiedTSID"), ("SpecifiedTSID", "Nope")],
    ];

    for params in selections {
        for policy in NotFoundPolicy::ALL {
            let mut args = ParsedCommand::new("Test").with_param("IfNotFound", policy.name());
            for (name, value) in params.iter() {
                args.set(*name, *value);
            }

            let mut processor = Processor::new();
            let mut status = CommandStatus::new();
            let outcome = {
                let mut ctx = CommandContext::new(&mut processor, &mut status);
                ctx.resolve_selection(&args)
            };

            match policy {
                NotFoundPolicy::Ignore => {
                    assert!(outcome.is_ok(), "{}", args);
                    assert!(status.is_empty(), "{}", args);
                }
                NotFoundPolicy::Warn => {
                    assert!(outcome.is_ok(), "{}", args);
                    assert_eq!(status.rollup(CommandPhase::Run), Severity::Warning, "{}", args);
                }
                NotFoundPolicy::Fail => {
                    assert!(outcome.is_err(), "{}", args);
                }
            }
        }
    }
}
