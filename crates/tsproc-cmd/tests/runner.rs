//! Two-phase status and partial-run behavior of the command runner

use tsproc_cmd::{CommandPhase, CommandRunner, RunnerConfig, Severity, StatusRecord};
use tsproc_processor::Processor;
use tsproc_series::{TimeSeries, TsIdent};

fn processor() -> Processor {
    let mut processor = Processor::new();
    for (loc, alias) in [("A", "A1"), ("B", "B1"), ("C", "A2")] {
        processor
            .table_mut()
            .append(TimeSeries::new(TsIdent::new(loc, "USGS", "Streamflow", "Day")).with_alias(alias))
            .unwrap();
    }
    processor
}

fn run_records(runner: &CommandRunner) -> Vec<Vec<StatusRecord>> {
    runner
        .entries()
        .iter()
        .map(|e| e.status().records_for(CommandPhase::Run).cloned().collect())
        .collect()
}

#[test]
fn rerun_does_not_accumulate_records() {
    let mut runner = CommandRunner::default();
    runner.load_script(
        "SelectTimeSeries(TSList=AllMatchingTSID,TSID=Z*)\n\
         Message(Message=Note,CommandStatus=Warning)",
    );
    let mut processor = processor();

    let first_summary = runner.run(&mut processor);
    let first = run_records(&runner);
    let second_summary = runner.run(&mut processor);
    let second = run_records(&runner);

    assert_eq!(first, second);
    assert_eq!(first_summary, second_summary);
    assert_eq!(first[0].len(), 1);
    assert_eq!(first_summary.severity, Severity::Warning);
}

#[test]
fn failed_command_does_not_stop_the_run() {
    let mut runner = CommandRunner::default();
    runner.load_script(
        "SelectTimeSeries(TSList=AllMatchingTSID,TSID=A*)\n\
         Free(TSList=AllMatchingTSID,TSID=Z*,IfNotFound=Fail)\n\
         SetProperty(PropertyName=Done,PropertyValue=yes)",
    );
    let mut processor = processor();
    let summary = runner.run(&mut processor);

    assert_eq!(summary.commands.len(), 3);
    assert_eq!(summary.commands[0].run, Severity::Success);
    assert_eq!(summary.commands[1].run, Severity::Failure);
    assert_eq!(summary.commands[2].run, Severity::Success);
    assert_eq!(summary.severity, Severity::Failure);
    assert!(processor.props().contains("Done"));
    assert_eq!(processor.table().len(), 3);
}

#[test]
fn oversized_series_fails_only_its_command() {
    let mut runner = CommandRunner::default();
    runner.load_script(
        "NewTimeSeries(Alias=Big,NewTSID=\"X.USGS.Flow.Minute\",SetStart=0001-01-01,SetEnd=9999-12-31)\n\
         SetProperty(PropertyName=After,PropertyValue=yes)",
    );
    let mut processor = processor();
    let summary = runner.run(&mut processor);

    assert_eq!(summary.commands[0].run, Severity::Failure);
    assert_eq!(summary.commands[1].run, Severity::Success);
    assert!(processor.props().contains("After"));
    assert_eq!(processor.table().index_of_alias("Big"), None);
}

#[test]
fn initialize_failure_skips_run_only_for_that_command() {
    let mut runner = CommandRunner::default();
    runner.load_script(
        "Scale(TSList=AllTS)\n\
         Scale(TSList=AllTS,ScaleValue=2,Bogus=1)\n\
         TS Total = NewTimeSeries(NewTSID=\"Total.Calc.Streamflow.Day\")",
    );

    let entries = runner.entries();
    assert_eq!(entries[0].status().rollup(CommandPhase::Initialize), Severity::Failure);
    assert_eq!(entries[1].status().rollup(CommandPhase::Initialize), Severity::Warning);
    assert!(entries[1].is_runnable());
    assert_eq!(
        entries[2].describe(),
        "NewTimeSeries(Alias=Total,NewTSID=Total.Calc.Streamflow.Day)"
    );

    let mut processor = processor();
    let summary = runner.run(&mut processor);
    assert_eq!(summary.commands[0].run, Severity::Failure);
    assert_eq!(summary.commands[2].run, Severity::Warning);
    assert_eq!(processor.table().len(), 4);
    assert_eq!(processor.table().index_of_alias("Total"), Some(3));
}

#[test]
fn default_policy_from_config() {
    let config = RunnerConfig::from_json_str(r#"{"default_not_found": "Ignore"}"#).unwrap();
    let mut runner = CommandRunner::new(config);
    runner.add_command("Free(TSList=AllMatchingTSID,TSID=Z*)");

    let mut processor = processor();
    let summary = runner.run(&mut processor);
    assert_eq!(summary.severity, Severity::Success);
    assert!(runner.entries()[0].status().is_empty());
}
