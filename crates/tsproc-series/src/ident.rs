//! Structured time series identifiers
//!
//! An identifier is written `Location.Source.DataType.Interval[.Scenario]`.
//! Source and scenario may be empty; location, data type and interval may not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SeriesError, SeriesResult};
use crate::interval::TimeInterval;

/// Structured identity of a time series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TsIdent {
    /// Location (station, basin, node, ...)
    pub location: String,
    /// Data source (agency, model, ...)
    pub source: String,
    /// Data type (Streamflow, Precip, ...)
    pub data_type: String,
    /// Interval text as written (`Day`, `6Hour`, ...)
    pub interval: String,
    /// Scenario (empty when not used)
    pub scenario: String,
}

impl TsIdent {
    /// Create an identifier from its parts without a scenario
    pub fn new(
        location: impl Into<String>,
        source: impl Into<String>,
        data_type: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            source: source.into(),
            data_type: data_type.into(),
            interval: interval.into(),
            scenario: String::new(),
        }
    }

    /// Set the scenario
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = scenario.into();
        self
    }

    /// Parse the interval part
    pub fn time_interval(&self) -> SeriesResult<TimeInterval> {
        self.interval.parse()
    }

    /// Parse identifier text
    pub fn parse(text: &str) -> SeriesResult<Self> {
        let text = text.trim();
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() < 4 || parts.len() > 5 {
            return Err(SeriesError::invalid_ident(
                text,
                format!("expected 4 or 5 '.'-separated parts, got {}", parts.len()),
            ));
        }

        let ident = TsIdent {
            location: parts[0].trim().to_string(),
            source: parts[1].trim().to_string(),
            data_type: parts[2].trim().to_string(),
            interval: parts[3].trim().to_string(),
            scenario: parts.get(4).map(|s| s.trim().to_string()).unwrap_or_default(),
        };

        if ident.location.is_empty() {
            return Err(SeriesError::invalid_ident(text, "location is empty"));
        }
        if ident.data_type.is_empty() {
            return Err(SeriesError::invalid_ident(text, "data type is empty"));
        }
        if ident.interval.is_empty() {
            return Err(SeriesError::invalid_ident(text, "interval is empty"));
        }

        Ok(ident)
    }
}

impl FromStr for TsIdent {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TsIdent::parse(s)
    }
}

impl fmt::Display for TsIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.location, self.source, self.data_type, self.interval
        )?;
        if !self.scenario.is_empty() {
            write!(f, ".{}", self.scenario)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_parts() {
        let ident = TsIdent::parse("Gauge1.USGS.Streamflow.Day").unwrap();
        assert_eq!(ident.location, "Gauge1");
        assert_eq!(ident.source, "USGS");
        assert_eq!(ident.data_type, "Streamflow");
        assert_eq!(ident.interval, "Day");
        assert!(ident.scenario.is_empty());
        assert_eq!(ident.to_string(), "Gauge1.USGS.Streamflow.Day");
    }

    #[test]
    fn test_parse_with_scenario_and_empty_source() {
        let ident = TsIdent::parse("Res2..Storage.Month.Hist").unwrap();
        assert_eq!(ident.source, "");
        assert_eq!(ident.scenario, "Hist");
        assert_eq!(ident.to_string(), "Res2..Storage.Month.Hist");
    }

    #[test]
    fn test_parse_rejects_short_or_empty_parts() {
        assert!(TsIdent::parse("A.B.C").is_err());
        assert!(TsIdent::parse(".B.C.Day").is_err());
        assert!(TsIdent::parse("A.B..Day").is_err());
        assert!(TsIdent::parse("A.B.C.").is_err());
    }
}
