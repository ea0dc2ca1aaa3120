//! Command parameters
//!
//! Commands take named parameters only. Values are kept as text until the
//! Run phase so `${Name}` references can be expanded against the property
//! values current at that point.

use std::borrow::Cow;
use std::fmt;

use tsproc_processor::DateTimeToken;
use tsproc_props::PropType;
use tsproc_select::{PositionList, SelectionKind};

use crate::policy::NotFoundPolicy;

/// Expected form of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Double,
    Boolean,
    /// Literal date/time or a date/time token such as `OutputStart`
    DateTime,
    /// `TSList` selection kind name
    TsList,
    /// `TSPosition` list
    Positions,
    /// `IfNotFound` policy name
    Policy,
    /// `PropertyType` name
    PropType,
    /// One of a fixed set of words, compared case-insensitively
    Choice(&'static [&'static str]),
}

impl ParamKind {
    /// Check a value, returning the reason it is invalid
    pub fn check(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            ParamKind::String => Ok(()),
            ParamKind::Integer => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not an integer", value)),
            ParamKind::Double => value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a number", value)),
            ParamKind::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" | "false" => Ok(()),
                _ => Err(format!("'{}' is not True or False", value)),
            },
            ParamKind::DateTime => value
                .parse::<DateTimeToken>()
                .map(|_| ())
                .map_err(|e| e.to_string()),
            ParamKind::TsList => value
                .parse::<SelectionKind>()
                .map(|_| ())
                .map_err(|e| e.to_string()),
            ParamKind::Positions => PositionList::parse(value)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            ParamKind::Policy => value
                .parse::<NotFoundPolicy>()
                .map(|_| ())
                .map_err(|e| e.to_string()),
            ParamKind::PropType => value
                .parse::<PropType>()
                .map(|_| ())
                .map_err(|e| e.to_string()),
            ParamKind::Choice(choices) => {
                if choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
                    Ok(())
                } else {
                    Err(format!("'{}' is not one of {}", value, choices.join(", ")))
                }
            }
        }
    }
}

/// Parameter definition used for generic validation and help
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDef {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamDef {
    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

/// A parsed command with its name and named parameters in the order given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The command name (e.g., "Free", "SetProperty")
    pub name: String,
    /// Parameters as (name, value) pairs
    pub params: Vec<(String, String)>,
}

impl ParsedCommand {
    /// Create a new parsed command with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a parameter, replacing an existing value in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }

    /// Remove a parameter, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.params.iter().position(|(n, _)| n == name)?;
        Some(self.params.remove(pos).1)
    }

    /// Get a parameter value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a parameter value, with default
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Check if a parameter is given
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Canonical text form: `Name(Key=Value,Key="Quoted value")`
impl fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", name, quote_value(value))?;
        }
        write!(f, ")")
    }
}

/// Quote a value unless it is a plain token
pub fn quote_value(value: &str) -> Cow<'_, str> {
    if is_plain_token(value) {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

pub(crate) fn is_plain_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_kind_check() {
        assert!(ParamKind::Integer.check("12").is_ok());
        assert!(ParamKind::Integer.check("1.5").is_err());
        assert!(ParamKind::Double.check("1.5").is_ok());
        assert!(ParamKind::Boolean.check("TRUE").is_ok());
        assert!(ParamKind::Boolean.check("yes").is_err());
        assert!(ParamKind::DateTime.check("OutputStart").is_ok());
        assert!(ParamKind::DateTime.check("2020-01-05 06").is_ok());
        assert!(ParamKind::DateTime.check("soon").is_err());
        assert!(ParamKind::TsList.check("AllMatchingTSID").is_ok());
        assert!(ParamKind::Positions.check("1,3-4").is_ok());
        assert!(ParamKind::Policy.check("fail").is_ok());
        assert!(ParamKind::PropType.check("Double").is_ok());
        assert!(ParamKind::Choice(&["True", "False"]).check("false").is_ok());
        assert!(ParamKind::Choice(&["True", "False"]).check("maybe").is_err());
    }

    #[test]
    fn test_parsed_command() {
        let mut cmd = ParsedCommand::new("Scale")
            .with_param("TSID", "A*")
            .with_param("ScaleValue", "2");

        assert_eq!(cmd.get("TSID"), Some("A*"));
        assert_eq!(cmd.get_or("IfNotFound", "Warn"), "Warn");

        cmd.set("TSID", "B*");
        assert_eq!(cmd.params[0], ("TSID".to_string(), "B*".to_string()));
        assert_eq!(cmd.remove("ScaleValue"), Some("2".to_string()));
        assert_eq!(cmd.param_count(), 1);
    }

    #[test]
    fn test_canonical_format() {
        let cmd = ParsedCommand::new("SelectTimeSeries")
            .with_param("TSList", "AllMatchingTSID")
            .with_param("TSID", "A*")
            .with_param("Description", "say \"hi\"");
        assert_eq!(
            cmd.to_string(),
            r#"SelectTimeSeries(TSList=AllMatchingTSID,TSID="A*",Description="say \"hi\"")"#
        );
        assert_eq!(ParsedCommand::new("Free").to_string(), "Free()");
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("Loc.USGS.Flow.Day"), "Loc.USGS.Flow.Day");
        assert_eq!(quote_value("2020-01-01"), "2020-01-01");
        assert_eq!(quote_value(""), "\"\"");
        assert_eq!(quote_value("a b"), "\"a b\"");
        assert_eq!(quote_value(r"C:\dir"), r#""C:\\dir""#);
    }
}
