//! Selection resolution against the result table

use bitvec::prelude::*;
use tsproc_series::{ResultTable, TimeSeries};

use crate::pattern::Pattern;
use crate::position::{PositionItem, PositionList};
use crate::result::SelectionResult;
use crate::spec::SelectionSpec;

/// Resolve a selection specification against the current table contents
///
/// Never mutates the table. Result order is table order, except for
/// explicit identifier lists, which keep the order given.
pub fn resolve(spec: &SelectionSpec, table: &ResultTable) -> SelectionResult {
    let result = match spec {
        SelectionSpec::AllEntries => SelectionResult::from_indices((0..table.len()).collect()),
        SelectionSpec::AllMatching(pattern) => SelectionResult::from_indices(
            table
                .iter_indexed()
                .filter(|(_, ts)| matches_entry(pattern, ts))
                .map(|(i, _)| i)
                .collect(),
        ),
        SelectionSpec::FirstMatching(pattern) => SelectionResult::from_indices(
            table
                .iter_indexed()
                .find(|(_, ts)| matches_entry(pattern, ts))
                .map(|(i, _)| i)
                .into_iter()
                .collect(),
        ),
        SelectionSpec::LastMatching(pattern) => SelectionResult::from_indices(
            table
                .iter_indexed()
                .filter(|(_, ts)| matches_entry(pattern, ts))
                .map(|(i, _)| i)
                .last()
                .into_iter()
                .collect(),
        ),
        SelectionSpec::Selected => SelectionResult::from_indices(
            table
                .iter_indexed()
                .filter(|(_, ts)| ts.selected)
                .map(|(i, _)| i)
                .collect(),
        ),
        SelectionSpec::EnsembleMembers(id) => SelectionResult::from_indices(
            table
                .iter_indexed()
                .filter(|(_, ts)| ts.ensemble_id.as_deref() == Some(id.as_str()))
                .map(|(i, _)| i)
                .collect(),
        ),
        SelectionSpec::Positions(list) => resolve_positions(list, table.len()),
        SelectionSpec::Explicit(ids) => resolve_explicit(ids, table),
    };

    log::debug!(
        "resolved {} -> {} match(es), {} not found",
        spec,
        result.len(),
        result.not_found_count()
    );
    result
}

/// Whether an entry matches a pattern: alias first, then identifier text
pub fn matches_entry(pattern: &Pattern, ts: &TimeSeries) -> bool {
    if let Some(alias) = &ts.alias {
        if pattern.matches(alias) {
            return true;
        }
    }
    pattern.matches(&ts.identifier())
}

fn resolve_positions(list: &PositionList, len: usize) -> SelectionResult {
    let mut result = SelectionResult::new();
    let mut seen = bitvec![usize, Lsb0; 0; len];
    let len = len as i64;

    for item in &list.items {
        let (start, end) = match *item {
            PositionItem::Single(p) => (p, p),
            PositionItem::Range(s, e) => (s, e),
        };

        // In-range part of the item; the rest is reported without iterating over it
        let lo = start.max(1);
        let hi = end.min(len);
        let in_range = if hi >= lo { (hi - lo + 1) as u64 } else { 0 };
        let missing = item.count() - in_range;
        if missing > 0 {
            result.add_not_found(
                missing as usize,
                format!("position {} (table has {} time series)", item, len),
            );
        }

        for position in lo..=hi {
            let index = (position - 1) as usize;
            if seen[index] {
                result.add_duplicate(position);
            } else {
                seen.set(index, true);
            }
        }
    }

    for index in seen.iter_ones() {
        result.push(index);
    }
    result
}

fn resolve_explicit(ids: &[String], table: &ResultTable) -> SelectionResult {
    let mut result = SelectionResult::new();
    for id in ids {
        let pattern = Pattern::exact(id.as_str());
        // Most recently appended match wins
        let found = table
            .iter_indexed()
            .filter(|(_, ts)| matches_entry(&pattern, ts))
            .map(|(i, _)| i)
            .last();
        match found {
            Some(index) => result.push(index),
            None => result.add_not_found(1, format!("time series \"{}\"", id)),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SelectionKind;
    use tsproc_series::TsIdent;

    fn table(aliases: &[&str]) -> ResultTable {
        let mut table = ResultTable::new();
        for (i, alias) in aliases.iter().enumerate() {
            let ident = TsIdent::new(format!("Loc{}", i + 1), "USGS", "Streamflow", "Day");
            table.append(TimeSeries::new(ident).with_alias(*alias)).unwrap();
        }
        table
    }

    fn positions(text: &str) -> SelectionSpec {
        SelectionSpec::from_params(SelectionKind::TsPosition, None, None, Some(text), None).unwrap()
    }

    #[test]
    fn test_all_matching_table_order() {
        let t = table(&["A1", "B1", "A2"]);
        let result = resolve(&SelectionSpec::all_matching("A*"), &t);
        assert_eq!(result.indices(), &[0, 2]);
        let names: Vec<_> = result.entries(&t).iter().map(|ts| ts.display_name()).collect();
        assert_eq!(names, vec!["A1", "A2"]);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let t = table(&["A1", "a2"]);
        let result = resolve(&SelectionSpec::all_matching("a*"), &t);
        assert_eq!(result.indices(), &[1]);
    }

    #[test]
    fn test_pattern_falls_back_to_identifier() {
        let t = table(&["A1", "B1", "A2"]);
        let result = resolve(&SelectionSpec::all_matching("Loc2.*"), &t);
        assert_eq!(result.indices(), &[1]);

        let result = resolve(&SelectionSpec::all_matching("*.Day"), &t);
        assert_eq!(result.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_first_and_last_matching() {
        let t = table(&["A1", "B1", "A2"]);
        let first = resolve(&SelectionSpec::FirstMatching(Pattern::new("A*")), &t);
        assert_eq!(first.indices(), &[0]);
        let last = resolve(&SelectionSpec::LastMatching(Pattern::new("A*")), &t);
        assert_eq!(last.indices(), &[2]);

        let none = resolve(&SelectionSpec::FirstMatching(Pattern::new("Z*")), &t);
        assert!(none.is_empty());
        assert_eq!(none.not_found_count(), 0);
    }

    #[test]
    fn test_positions_in_range() {
        let t = table(&["a", "b", "c", "d", "e", "f"]);
        let result = resolve(&positions("2,4-5"), &t);
        assert_eq!(result.indices(), &[1, 3, 4]);
        assert_eq!(result.not_found_count(), 0);
        assert!(result.duplicates().is_empty());
    }

    #[test]
    fn test_positions_out_of_range() {
        let t = table(&["a", "b", "c", "d", "e", "f"]);
        let result = resolve(&positions("9"), &t);
        assert!(result.is_empty());
        assert_eq!(result.not_found_count(), 1);

        let result = resolve(&positions("0,5-8"), &t);
        assert_eq!(result.indices(), &[4, 5]);
        assert_eq!(result.not_found_count(), 3);
        assert_eq!(result.not_found().len(), 2);
    }

    #[test]
    fn test_positions_duplicates_reported_and_sorted() {
        let t = table(&["a", "b", "c", "d"]);
        let result = resolve(&positions("4,1-2,2"), &t);
        assert_eq!(result.indices(), &[0, 1, 3]);
        assert_eq!(result.duplicates(), &[2]);
    }

    #[test]
    fn test_selected_and_ensemble() {
        let mut t = table(&["a", "b", "c"]);
        t.set_selected(2, true).unwrap();
        t.append(
            TimeSeries::new(TsIdent::new("E", "", "Flow", "Day"))
                .with_ensemble("Trace"),
        )
        .unwrap();

        assert_eq!(resolve(&SelectionSpec::Selected, &t).indices(), &[2]);
        assert_eq!(
            resolve(&SelectionSpec::EnsembleMembers("Trace".into()), &t).indices(),
            &[3]
        );
        assert!(resolve(&SelectionSpec::EnsembleMembers("Nope".into()), &t).is_empty());
    }

    #[test]
    fn test_explicit_keeps_caller_order() {
        let t = table(&["A1", "B1", "A2"]);
        let spec = SelectionSpec::Explicit(vec![
            "A2".to_string(),
            "Missing".to_string(),
            "Loc1.USGS.Streamflow.Day".to_string(),
        ]);
        let result = resolve(&spec, &t);
        assert_eq!(result.indices(), &[2, 0]);
        assert_eq!(result.not_found_count(), 1);
    }

    #[test]
    fn test_explicit_is_literal() {
        let t = table(&["A1", "A2"]);
        let spec = SelectionSpec::Explicit(vec!["A*".to_string()]);
        assert!(resolve(&spec, &t).is_empty());
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let t = table(&["A1", "B1", "A2"]);
        let spec = SelectionSpec::all_matching("*1");
        let first = resolve(&spec, &t);
        let second = resolve(&spec, &t);
        assert_eq!(first, second);
        assert_eq!(t.len(), 3);
    }
}
