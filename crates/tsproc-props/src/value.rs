//! Property value types

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PropError, PropResult};

/// Text form used for date/time values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Type of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropType {
    String,
    Int,
    Float,
    Bool,
    DateTime,
    Object,
}

impl PropType {
    /// Name used in command parameters (`PropertyType=...`)
    pub fn name(&self) -> &'static str {
        match self {
            PropType::String => "String",
            PropType::Int => "Integer",
            PropType::Float => "Double",
            PropType::Bool => "Boolean",
            PropType::DateTime => "DateTime",
            PropType::Object => "Object",
        }
    }
}

impl FromStr for PropType {
    type Err = PropError;

    fn from_str(s: &str) -> PropResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(PropType::String),
            "integer" | "int" => Ok(PropType::Int),
            "double" | "float" => Ok(PropType::Float),
            "boolean" | "bool" => Ok(PropType::Bool),
            "datetime" => Ok(PropType::DateTime),
            "object" => Ok(PropType::Object),
            _ => Err(PropError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Structured value set by commands that publish more than a scalar
    Object(serde_json::Value),
}

impl PropValue {
    /// Get the type of this value
    pub fn prop_type(&self) -> PropType {
        match self {
            PropValue::String(_) => PropType::String,
            PropValue::Int(_) => PropType::Int,
            PropValue::Float(_) => PropType::Float,
            PropValue::Bool(_) => PropType::Bool,
            PropValue::DateTime(_) => PropType::DateTime,
            PropValue::Object(_) => PropType::Object,
        }
    }

    /// Convert text to a value of the given type
    pub fn parse_typed(prop_type: PropType, text: &str) -> PropResult<Self> {
        let trimmed = text.trim();
        match prop_type {
            PropType::String => Ok(PropValue::String(text.to_string())),
            PropType::Int => trimmed
                .parse()
                .map(PropValue::Int)
                .map_err(|_| PropError::invalid_value("integer", text)),
            PropType::Float => trimmed
                .parse()
                .map(PropValue::Float)
                .map_err(|_| PropError::invalid_value("double", text)),
            PropType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(PropValue::Bool(true)),
                "false" => Ok(PropValue::Bool(false)),
                _ => Err(PropError::invalid_value("boolean", text)),
            },
            PropType::DateTime => parse_datetime(trimmed)
                .map(PropValue::DateTime)
                .ok_or_else(|| PropError::invalid_value("date/time", text)),
            PropType::Object => serde_json::from_str(trimmed)
                .map(PropValue::Object)
                .map_err(|_| PropError::invalid_value("JSON object", text)),
        }
    }

    /// Parse literal date/time text
    pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
        parse_datetime(text)
    }

    /// Try to get as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as a float (integers are widened)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropValue::Float(f) => Some(*f),
            PropValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as a date/time
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            PropValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::String(s) => write!(f, "{}", s),
            PropValue::Int(i) => write!(f, "{}", i),
            PropValue::Float(n) => write!(f, "{}", n),
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            PropValue::Object(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        PropValue::Int(i)
    }
}

impl From<f64> for PropValue {
    fn from(f: f64) -> Self {
        PropValue::Float(f)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<NaiveDateTime> for PropValue {
    fn from(dt: NaiveDateTime) -> Self {
        PropValue::DateTime(dt)
    }
}

/// Parse literal date/time text
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY-MM-DD hh`, `YYYY-MM-DD hh:mm`
/// and `YYYY-MM-DD hh:mm:ss`, with `T` also accepted between date and time.
/// Missing parts default to the start of the period.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let (date_part, time_part) = match text.find(&[' ', 'T'][..]) {
        Some(pos) => (&text[..pos], Some(text[pos + 1..].trim())),
        None => (text, None),
    };

    let mut fields = date_part.split('-');
    let year: i32 = fields.next()?.parse().ok()?;
    let month: u32 = match fields.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match fields.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    if fields.next().is_some() {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = match time_part {
        None => NaiveTime::MIN,
        Some(t) => {
            let mut fields = t.split(':');
            let hour: u32 = fields.next()?.parse().ok()?;
            let minute: u32 = match fields.next() {
                Some(m) => m.parse().ok()?,
                None => 0,
            };
            let second: u32 = match fields.next() {
                Some(s) => s.parse().ok()?,
                None => 0,
            };
            if fields.next().is_some() {
                return None;
            }
            NaiveTime::from_hms_opt(hour, minute, second)?
        }
    };

    Some(NaiveDateTime::new(date, time))
}
