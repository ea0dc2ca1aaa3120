//! Ordered result table
//!
//! Holds every time series created during a run. An entry's index is its
//! append position; removing an entry shifts the entries above it down by one,
//! so callers re-resolve selections after a removal instead of caching indices.

use ahash::AHashSet;

use crate::error::{SeriesError, SeriesResult};
use crate::series::TimeSeries;

/// Ordered collection of time series
#[derive(Debug, Default, Clone)]
pub struct ResultTable {
    entries: Vec<TimeSeries>,
}

impl ResultTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning its index
    ///
    /// Fails if the alias is already declared by another entry, or if a
    /// non-ensemble entry with the same identity already exists.
    pub fn append(&mut self, ts: TimeSeries) -> SeriesResult<usize> {
        self.check_unique(&ts, None)?;
        self.entries.push(ts);
        let index = self.entries.len() - 1;
        log::debug!("appended time series [{}] {}", index, self.entries[index].display_name());
        Ok(index)
    }

    /// Replace the entry at `index`, keeping its position
    pub fn replace_at(&mut self, index: usize, ts: TimeSeries) -> SeriesResult<TimeSeries> {
        self.check_index(index)?;
        self.check_unique(&ts, Some(index))?;
        Ok(std::mem::replace(&mut self.entries[index], ts))
    }

    /// Remove and return the entry at `index`
    pub fn remove(&mut self, index: usize) -> SeriesResult<TimeSeries> {
        self.check_index(index)?;
        let ts = self.entries.remove(index);
        log::debug!("removed time series [{}] {}", index, ts.display_name());
        Ok(ts)
    }

    /// Get an entry by index
    pub fn get(&self, index: usize) -> Option<&TimeSeries> {
        self.entries.get(index)
    }

    /// Get a mutable entry by index
    ///
    /// Identity and alias should be changed through [`ResultTable::set_alias`]
    /// or [`ResultTable::replace_at`] so uniqueness is re-checked.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TimeSeries> {
        self.entries.get_mut(index)
    }

    /// Change the alias of the entry at `index`
    pub fn set_alias(&mut self, index: usize, alias: Option<String>) -> SeriesResult<()> {
        self.check_index(index)?;
        if let Some(alias) = &alias {
            if let Some(other) = self.index_of_alias(alias) {
                if other != index {
                    return Err(SeriesError::DuplicateAlias(alias.clone()));
                }
            }
        }
        self.entries[index].alias = alias;
        Ok(())
    }

    /// Set the selection flag of the entry at `index`
    pub fn set_selected(&mut self, index: usize, selected: bool) -> SeriesResult<()> {
        self.check_index(index)?;
        self.entries[index].selected = selected;
        Ok(())
    }

    /// Iterate over entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &TimeSeries> {
        self.entries.iter()
    }

    /// Iterate over entries with their indices
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &TimeSeries)> {
        self.entries.iter().enumerate()
    }

    /// Index of the entry declaring `alias`
    pub fn index_of_alias(&self, alias: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|ts| ts.alias.as_deref() == Some(alias))
    }

    /// Distinct ensemble ids in order of first appearance
    pub fn ensemble_ids(&self) -> Vec<String> {
        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut ids = Vec::new();
        for id in self.entries.iter().filter_map(|ts| ts.ensemble_id.as_deref()) {
            if seen.insert(id) {
                ids.push(id.to_string());
            }
        }
        ids
    }

    fn check_index(&self, index: usize) -> SeriesResult<()> {
        if index >= self.entries.len() {
            return Err(SeriesError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    fn check_unique(&self, ts: &TimeSeries, skip: Option<usize>) -> SeriesResult<()> {
        for (i, other) in self.entries.iter().enumerate() {
            if Some(i) == skip {
                continue;
            }
            if let (Some(a), Some(b)) = (&ts.alias, &other.alias) {
                if a == b {
                    return Err(SeriesError::DuplicateAlias(a.clone()));
                }
            }
            if !ts.is_ensemble_member() && !other.is_ensemble_member() && ts.ident == other.ident
            {
                return Err(SeriesError::DuplicateIdent(ts.identifier()));
            }
        }
        Ok(())
    }
}
