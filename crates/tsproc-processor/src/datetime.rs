//! Date/time token parsing
//!
//! Commands accept date/time parameters either as literal text or as symbolic
//! tokens resolved against the processor: the global period bounds, the
//! current time truncated to a precision, or a `${Name}` property reference.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use tsproc_props::{PropValue, PropertyStore};

use crate::error::{RequestError, RequestResult};
use crate::processor::{PROP_INPUT_END, PROP_INPUT_START, PROP_OUTPUT_END, PROP_OUTPUT_START};

/// A parsed date/time token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeToken {
    OutputStart,
    OutputEnd,
    InputStart,
    InputEnd,
    CurrentToMinute,
    CurrentToHour,
    CurrentToDay,
    Literal(NaiveDateTime),
}

impl DateTimeToken {
    /// Property backing a period token
    fn property(&self) -> Option<&'static str> {
        match self {
            DateTimeToken::OutputStart => Some(PROP_OUTPUT_START),
            DateTimeToken::OutputEnd => Some(PROP_OUTPUT_END),
            DateTimeToken::InputStart => Some(PROP_INPUT_START),
            DateTimeToken::InputEnd => Some(PROP_INPUT_END),
            _ => None,
        }
    }

    /// Resolve the token to a concrete date/time
    pub fn resolve(&self, props: &PropertyStore, now: NaiveDateTime) -> RequestResult<NaiveDateTime> {
        if let Some(name) = self.property() {
            return props
                .get_datetime(name)?
                .ok_or_else(|| RequestError::Unset(name.to_string()));
        }
        Ok(match self {
            DateTimeToken::CurrentToMinute => truncate(now, 60),
            DateTimeToken::CurrentToHour => truncate(now, 3600),
            DateTimeToken::CurrentToDay => NaiveDateTime::new(now.date(), NaiveTime::MIN),
            DateTimeToken::Literal(dt) => *dt,
            // Period tokens returned above
            _ => now,
        })
    }
}

impl FromStr for DateTimeToken {
    type Err = RequestError;

    fn from_str(s: &str) -> RequestResult<Self> {
        let trimmed = s.trim();
        let token = match trimmed.to_ascii_lowercase().as_str() {
            "outputstart" => DateTimeToken::OutputStart,
            "outputend" => DateTimeToken::OutputEnd,
            "inputstart" => DateTimeToken::InputStart,
            "inputend" => DateTimeToken::InputEnd,
            "currenttominute" => DateTimeToken::CurrentToMinute,
            "currenttohour" => DateTimeToken::CurrentToHour,
            "currenttoday" => DateTimeToken::CurrentToDay,
            _ => PropValue::parse_datetime(trimmed)
                .map(DateTimeToken::Literal)
                .ok_or_else(|| RequestError::invalid(format!("'{}' is not a date/time", trimmed)))?,
        };
        Ok(token)
    }
}

impl fmt::Display for DateTimeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeToken::OutputStart => f.write_str("OutputStart"),
            DateTimeToken::OutputEnd => f.write_str("OutputEnd"),
            DateTimeToken::InputStart => f.write_str("InputStart"),
            DateTimeToken::InputEnd => f.write_str("InputEnd"),
            DateTimeToken::CurrentToMinute => f.write_str("CurrentToMinute"),
            DateTimeToken::CurrentToHour => f.write_str("CurrentToHour"),
            DateTimeToken::CurrentToDay => f.write_str("CurrentToDay"),
            DateTimeToken::Literal(dt) => write!(f, "{}", dt.format(tsproc_props::DATETIME_FORMAT)),
        }
    }
}

/// Parse and resolve date/time text
///
/// A bare `${Name}` reference takes the property value directly, so a
/// DateTime property resolves without a text round trip. Other references
/// are expanded first; an undefined reference is an error.
pub fn parse_datetime_token(
    text: &str,
    props: &PropertyStore,
    now: NaiveDateTime,
) -> RequestResult<NaiveDateTime> {
    let trimmed = text.trim();
    if let Some(name) = trimmed.strip_prefix("${").and_then(|t| t.strip_suffix('}')) {
        if let Some(PropValue::DateTime(dt)) = props.get(name) {
            return Ok(*dt);
        }
    }

    let expansion = props.expand(trimmed);
    if let Some(name) = expansion.missing.first() {
        return Err(RequestError::invalid(format!(
            "property '{}' referenced by '{}' is not defined",
            name, trimmed
        )));
    }
    expansion.text.parse::<DateTimeToken>()?.resolve(props, now)
}

fn truncate(dt: NaiveDateTime, seconds: u32) -> NaiveDateTime {
    let secs = dt.num_seconds_from_midnight();
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs - secs % seconds, 0)
        .unwrap_or(NaiveTime::MIN);
    NaiveDateTime::new(dt.date(), time)
}
