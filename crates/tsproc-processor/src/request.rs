//! Requests handled by the processor
//!
//! The request set is closed: every operation a command may ask of the
//! processor is a variant here, and [`Processor::request`](crate::Processor::request)
//! handles each one in a single exhaustive match.

use chrono::NaiveDateTime;
use tsproc_props::{Expansion, PropValue};
use tsproc_select::{SelectionResult, SelectionSpec};
use tsproc_series::TimeSeries;

/// Request to the processor
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Resolve a selection against the current table
    ResolveSelection { spec: SelectionSpec },
    /// Copy of the entry at an index
    GetEntry { index: usize },
    /// Remove the entry at an index
    RemoveEntry { index: usize },
    /// Append a new entry
    AppendEntry { series: TimeSeries },
    /// Replace the entry at an index
    ReplaceEntry { index: usize, series: TimeSeries },
    /// Set the selection flag of an entry
    SetSelected { index: usize, selected: bool },
    /// Look up a property
    GetProperty { name: String },
    /// Set a property
    SetProperty { name: String, value: PropValue },
    /// Expand `${Name}` references
    ExpandText { text: String },
    /// Resolve a date/time token
    ParseDateTime { token: String },
    /// Distinct ensemble ids in table order
    ListEnsembles,
    /// Number of entries in the table
    TableSize,
}

impl Request {
    /// Request name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Request::ResolveSelection { .. } => "ResolveSelection",
            Request::GetEntry { .. } => "GetEntry",
            Request::RemoveEntry { .. } => "RemoveEntry",
            Request::AppendEntry { .. } => "AppendEntry",
            Request::ReplaceEntry { .. } => "ReplaceEntry",
            Request::SetSelected { .. } => "SetSelected",
            Request::GetProperty { .. } => "GetProperty",
            Request::SetProperty { .. } => "SetProperty",
            Request::ExpandText { .. } => "ExpandText",
            Request::ParseDateTime { .. } => "ParseDateTime",
            Request::ListEnsembles => "ListEnsembles",
            Request::TableSize => "TableSize",
        }
    }

    /// Whether handling this request may change processor state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Request::RemoveEntry { .. }
                | Request::AppendEntry { .. }
                | Request::ReplaceEntry { .. }
                | Request::SetSelected { .. }
                | Request::SetProperty { .. }
        )
    }
}

/// Response from the processor
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Resolved selection
    Selection(SelectionResult),
    /// An entry (copied, removed, or replaced)
    Entry(Box<TimeSeries>),
    /// Index of an appended entry
    Index(usize),
    /// Property value (current, or previous for a set)
    Property(Option<PropValue>),
    /// Expanded text
    Expanded(Expansion),
    /// Resolved date/time
    DateTime(NaiveDateTime),
    /// List of names
    Names(Vec<String>),
    /// A count
    Size(usize),
    /// Request completed with nothing to return
    Done,
}

impl Response {
    /// Variant name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Response::Selection(_) => "Selection",
            Response::Entry(_) => "Entry",
            Response::Index(_) => "Index",
            Response::Property(_) => "Property",
            Response::Expanded(_) => "Expanded",
            Response::DateTime(_) => "DateTime",
            Response::Names(_) => "Names",
            Response::Size(_) => "Size",
            Response::Done => "Done",
        }
    }
}
