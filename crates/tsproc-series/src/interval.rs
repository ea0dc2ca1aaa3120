//! Data intervals
//!
//! Parses interval text such as `Day`, `6Hour` or `15Minute` and steps
//! date/times forward by one interval.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{SeriesError, SeriesResult};

/// Base unit of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalBase {
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl IntervalBase {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            IntervalBase::Minute => "Minute",
            IntervalBase::Hour => "Hour",
            IntervalBase::Day => "Day",
            IntervalBase::Month => "Month",
            IntervalBase::Year => "Year",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "min" | "minute" => Some(IntervalBase::Minute),
            "hour" => Some(IntervalBase::Hour),
            "day" => Some(IntervalBase::Day),
            "mon" | "month" => Some(IntervalBase::Month),
            "year" => Some(IntervalBase::Year),
            _ => None,
        }
    }
}

/// A regular data interval (`multiplier` x `base`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub base: IntervalBase,
    pub multiplier: u32,
}

impl TimeInterval {
    /// Create an interval
    pub fn new(base: IntervalBase, multiplier: u32) -> Self {
        Self { base, multiplier }
    }

    /// Step a date/time forward by one interval
    ///
    /// Returns `None` when the result is out of range.
    pub fn advance(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let m = i64::from(self.multiplier);
        match self.base {
            IntervalBase::Minute => dt.checked_add_signed(Duration::minutes(m)),
            IntervalBase::Hour => dt.checked_add_signed(Duration::hours(m)),
            IntervalBase::Day => dt.checked_add_signed(Duration::days(m)),
            IntervalBase::Month => dt.checked_add_months(Months::new(self.multiplier)),
            IntervalBase::Year => {
                dt.checked_add_months(Months::new(self.multiplier.checked_mul(12)?))
            }
        }
    }

    /// Number of interval steps in `[start, end]`, counting both ends
    ///
    /// Returns 0 when `end` is before `start`.
    pub fn count_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> usize {
        if end < start {
            return 0;
        }
        let m = i64::from(self.multiplier.max(1));
        let steps = match self.base {
            IntervalBase::Minute => (end - start).num_minutes() / m,
            IntervalBase::Hour => (end - start).num_hours() / m,
            IntervalBase::Day => (end - start).num_days() / m,
            IntervalBase::Month | IntervalBase::Year => {
                let months = i64::from(end.year() - start.year()) * 12
                    + i64::from(end.month()) - i64::from(start.month());
                let per = if self.base == IntervalBase::Year { 12 * m } else { m };
                months / per
            }
        };
        steps as usize + 1
    }
}

impl FromStr for TimeInterval {
    type Err = SeriesError;

    fn from_str(s: &str) -> SeriesResult<Self> {
        let s = s.trim();
        let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
        let rest = &s[digits.len()..];

        let multiplier = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| SeriesError::InvalidInterval(s.to_string()))?
        };
        if multiplier == 0 {
            return Err(SeriesError::InvalidInterval(s.to_string()));
        }

        let base = IntervalBase::from_name(rest)
            .ok_or_else(|| SeriesError::InvalidInterval(s.to_string()))?;
        Ok(TimeInterval { base, multiplier })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiplier == 1 {
            write!(f, "{}", self.base.name())
        } else {
            write!(f, "{}{}", self.multiplier, self.base.name())
        }
    }
}
