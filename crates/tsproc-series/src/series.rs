//! Time series entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{SeriesError, SeriesResult};
use crate::ident::TsIdent;

/// One dataset entry in the result table
///
/// Identity and group membership are used by selection; the period and
/// values are the payload that transform operations work on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Structured identifier
    pub ident: TsIdent,
    /// Optional human-readable alias, unique among entries that declare one
    pub alias: Option<String>,
    /// Ensemble this entry belongs to (None when not an ensemble member)
    pub ensemble_id: Option<String>,
    /// Selection flag used by `SelectedTS` lists
    pub selected: bool,
    /// Free-form description
    pub description: String,
    /// Data units
    pub units: String,
    /// First date/time of the data period
    pub start: Option<NaiveDateTime>,
    /// Last date/time of the data period
    pub end: Option<NaiveDateTime>,
    /// Data values, `None` for missing
    pub values: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Create an empty time series with the given identity
    pub fn new(ident: TsIdent) -> Self {
        Self {
            ident,
            alias: None,
            ensemble_id: None,
            selected: false,
            description: String::new(),
            units: String::new(),
            start: None,
            end: None,
            values: Vec::new(),
        }
    }

    /// Set the alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.alias = if alias.is_empty() { None } else { Some(alias) };
        self
    }

    /// Set the ensemble membership
    pub fn with_ensemble(mut self, ensemble_id: impl Into<String>) -> Self {
        let id = ensemble_id.into();
        self.ensemble_id = if id.is_empty() { None } else { Some(id) };
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the period and values
    pub fn with_data(
        mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        values: Vec<Option<f64>>,
    ) -> SeriesResult<Self> {
        if end < start {
            return Err(SeriesError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        self.start = Some(start);
        self.end = Some(end);
        self.values = values;
        Ok(self)
    }

    /// Full identifier text
    pub fn identifier(&self) -> String {
        self.ident.to_string()
    }

    /// Alias if set, otherwise the identifier text
    pub fn display_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.identifier(),
        }
    }

    /// Whether this entry is an ensemble member
    pub fn is_ensemble_member(&self) -> bool {
        self.ensemble_id.is_some()
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}
