//! Processor context

use chrono::{Local, NaiveDateTime};
use tsproc_props::{Expansion, PropValue, PropertyStore};
use tsproc_select::{SelectionResult, SelectionSpec};
use tsproc_series::{ResultTable, SeriesError};

use crate::datetime::parse_datetime_token;
use crate::error::RequestResult;
use crate::request::{Request, Response};

/// Start of the period data is read for
pub const PROP_INPUT_START: &str = "InputStart";
/// End of the period data is read for
pub const PROP_INPUT_END: &str = "InputEnd";
/// Start of the period results are produced for
pub const PROP_OUTPUT_START: &str = "OutputStart";
/// End of the period results are produced for
pub const PROP_OUTPUT_END: &str = "OutputEnd";

const PROP_WORKING_DIR: &str = "WorkingDir";
const PROP_RUN_START: &str = "RunStart";

/// Owns the result table and property store for a run
#[derive(Debug, Clone, Default)]
pub struct Processor {
    table: ResultTable,
    props: PropertyStore,
}

impl Processor {
    /// Create a processor with the built-in properties seeded
    pub fn new() -> Self {
        let mut processor = Self::default();
        processor.seed_properties();
        processor
    }

    fn seed_properties(&mut self) {
        if let Ok(dir) = std::env::current_dir() {
            self.set_builtin(PROP_WORKING_DIR, PropValue::String(dir.display().to_string()));
        }
        self.set_builtin(PROP_RUN_START, PropValue::DateTime(now()));
    }

    fn set_builtin(&mut self, name: &str, value: PropValue) {
        if let Err(e) = self.props.set(name, value) {
            log::warn!("Could not set built-in property {}: {}", name, e);
        }
    }

    /// Clear all entries and properties, then re-seed the built-ins
    pub fn reset(&mut self) {
        self.table = ResultTable::new();
        self.props = PropertyStore::new();
        self.seed_properties();
        log::debug!("processor reset");
    }

    /// Get the result table
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Get the result table mutably
    pub fn table_mut(&mut self) -> &mut ResultTable {
        &mut self.table
    }

    /// Get the property store
    pub fn props(&self) -> &PropertyStore {
        &self.props
    }

    /// Get the property store mutably
    pub fn props_mut(&mut self) -> &mut PropertyStore {
        &mut self.props
    }

    /// Resolve a selection against the current table
    pub fn resolve(&self, spec: &SelectionSpec) -> SelectionResult {
        tsproc_select::resolve(spec, &self.table)
    }

    /// Expand `${Name}` references
    pub fn expand(&self, text: &str) -> Expansion {
        self.props.expand(text)
    }

    /// Resolve a date/time token against the current properties
    pub fn parse_datetime(&self, token: &str) -> RequestResult<NaiveDateTime> {
        parse_datetime_token(token, &self.props, now())
    }

    /// Handle a request
    ///
    /// Handlers report failures as errors; nothing here panics on bad input.
    pub fn request(&mut self, request: Request) -> RequestResult<Response> {
        log::trace!("request {}", request.name());
        let response = match request {
            Request::ResolveSelection { spec } => Response::Selection(self.resolve(&spec)),
            Request::GetEntry { index } => {
                let ts = self.table.get(index).ok_or(SeriesError::IndexOutOfRange {
                    index,
                    len: self.table.len(),
                })?;
                Response::Entry(Box::new(ts.clone()))
            }
            Request::RemoveEntry { index } => Response::Entry(Box::new(self.table.remove(index)?)),
            Request::AppendEntry { series } => Response::Index(self.table.append(series)?),
            Request::ReplaceEntry { index, series } => {
                Response::Entry(Box::new(self.table.replace_at(index, series)?))
            }
            Request::SetSelected { index, selected } => {
                self.table.set_selected(index, selected)?;
                Response::Done
            }
            Request::GetProperty { name } => Response::Property(self.props.get(&name).cloned()),
            Request::SetProperty { name, value } => {
                Response::Property(self.props.set(&name, value)?)
            }
            Request::ExpandText { text } => Response::Expanded(self.expand(&text)),
            Request::ParseDateTime { token } => Response::DateTime(self.parse_datetime(&token)?),
            Request::ListEnsembles => Response::Names(self.table.ensemble_ids()),
            Request::TableSize => Response::Size(self.table.len()),
        };
        Ok(response)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;
    use tsproc_series::{TimeSeries, TsIdent};

    fn ts(loc: &str) -> TimeSeries {
        TimeSeries::new(TsIdent::new(loc, "USGS", "Streamflow", "Day"))
    }

    fn processor() -> Processor {
        let mut p = Processor::new();
        for (loc, alias) in [("A", "A1"), ("B", "B1"), ("C", "A2")] {
            p.request(Request::AppendEntry {
                series: ts(loc).with_alias(alias),
            })
            .unwrap();
        }
        p
    }

    #[test]
    fn test_builtin_properties() {
        let p = Processor::new();
        assert!(p.props().contains("RunStart"));
        assert!(p.props().get_datetime("RunStart").unwrap().is_some());
        assert!(!p.props().contains(PROP_OUTPUT_START));
    }

    #[test]
    fn test_resolve_request() {
        let mut p = processor();
        let response = p
            .request(Request::ResolveSelection {
                spec: SelectionSpec::all_matching("A*"),
            })
            .unwrap();
        match response {
            Response::Selection(result) => assert_eq!(result.indices(), &[0, 2]),
            other => panic!("unexpected response {:?}", other),
        }
        assert_eq!(p.table().len(), 3);
    }

    #[test]
    fn test_entry_requests() {
        let mut p = processor();
        assert_eq!(p.request(Request::TableSize).unwrap(), Response::Size(3));

        let removed = p.request(Request::RemoveEntry { index: 1 }).unwrap();
        assert_eq!(removed, Response::Entry(Box::new(ts("B").with_alias("B1"))));
        assert_eq!(p.request(Request::TableSize).unwrap(), Response::Size(2));

        let err = p.request(Request::GetEntry { index: 5 }).unwrap_err();
        assert_eq!(
            err,
            RequestError::Series(SeriesError::IndexOutOfRange { index: 5, len: 2 })
        );

        p.request(Request::SetSelected { index: 0, selected: true }).unwrap();
        assert!(p.table().get(0).unwrap().selected);
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut p = processor();
        let err = p
            .request(Request::AppendEntry {
                series: ts("D").with_alias("A1"),
            })
            .unwrap_err();
        assert_eq!(err, RequestError::Series(SeriesError::DuplicateAlias("A1".to_string())));
    }

    #[test]
    fn test_property_requests() {
        let mut p = processor();
        let previous = p
            .request(Request::SetProperty {
                name: "X".to_string(),
                value: PropValue::from("9"),
            })
            .unwrap();
        assert_eq!(previous, Response::Property(None));

        let expanded = p
            .request(Request::ExpandText {
                text: "Value=${X}".to_string(),
            })
            .unwrap();
        match expanded {
            Response::Expanded(e) => assert_eq!(e.text, "Value=9"),
            other => panic!("unexpected response {:?}", other),
        }

        assert!(matches!(
            p.request(Request::SetProperty {
                name: String::new(),
                value: PropValue::Int(1),
            }),
            Err(RequestError::Property(_))
        ));
    }

    #[test]
    fn test_parse_datetime_request() {
        let mut p = processor();
        assert_eq!(
            p.request(Request::ParseDateTime {
                token: "OutputEnd".to_string()
            }),
            Err(RequestError::Unset("OutputEnd".to_string()))
        );

        let end = PropValue::parse_datetime("2001-09-30").unwrap();
        p.props_mut().set(PROP_OUTPUT_END, PropValue::DateTime(end)).unwrap();
        assert_eq!(
            p.request(Request::ParseDateTime {
                token: "OutputEnd".to_string()
            })
            .unwrap(),
            Response::DateTime(end)
        );
    }

    #[test]
    fn test_reset() {
        let mut p = processor();
        p.props_mut().set("X", PropValue::Int(1)).unwrap();
        p.reset();
        assert!(p.table().is_empty());
        assert!(!p.props().contains("X"));
        assert!(p.props().contains("RunStart"));
    }
}
