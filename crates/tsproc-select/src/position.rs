//! 1-based position lists (`TSPosition`)
//!
//! Text form is comma-separated positions or `start-end` ranges, e.g. `2,4-5`.

use std::fmt;
use std::str::FromStr;

use crate::error::{SelectError, SelectResult};

/// A single item in a position list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionItem {
    /// Single 1-based position (e.g., `3`)
    Single(i64),
    /// Inclusive 1-based range (e.g., `4-6`)
    Range(i64, i64),
}

impl PositionItem {
    /// Iterate over the 1-based positions covered by this item
    pub fn positions(&self) -> impl Iterator<Item = i64> {
        let (start, end) = match *self {
            PositionItem::Single(p) => (p, p),
            PositionItem::Range(s, e) => (s, e),
        };
        start..=end
    }

    /// Number of positions covered
    pub fn count(&self) -> u64 {
        match *self {
            PositionItem::Single(_) => 1,
            PositionItem::Range(s, e) => (e - s) as u64 + 1,
        }
    }
}

impl fmt::Display for PositionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionItem::Single(p) => write!(f, "{}", p),
            PositionItem::Range(s, e) => write!(f, "{}-{}", s, e),
        }
    }
}

/// Parsed position list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionList {
    pub items: Vec<PositionItem>,
}

impl PositionList {
    /// Parse position list text
    pub fn parse(text: &str) -> SelectResult<Self> {
        let invalid = |reason: &str| SelectError::InvalidPosition {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let mut items = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty item"));
            }

            let item = match part.split_once('-') {
                Some((start, end)) => {
                    let start: i64 = start
                        .trim()
                        .parse()
                        .map_err(|_| invalid(&format!("'{}' is not a position range", part)))?;
                    let end: i64 = end
                        .trim()
                        .parse()
                        .map_err(|_| invalid(&format!("'{}' is not a position range", part)))?;
                    if end < start {
                        return Err(invalid(&format!("range '{}' ends before it starts", part)));
                    }
                    PositionItem::Range(start, end)
                }
                None => PositionItem::Single(
                    part.parse()
                        .map_err(|_| invalid(&format!("'{}' is not a position", part)))?,
                ),
            };
            items.push(item);
        }

        Ok(PositionList { items })
    }
}

impl FromStr for PositionList {
    type Err = SelectError;

    fn from_str(s: &str) -> SelectResult<Self> {
        PositionList::parse(s)
    }
}

impl fmt::Display for PositionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}
