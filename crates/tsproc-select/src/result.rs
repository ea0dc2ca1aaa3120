//! Selection result types

use tsproc_series::{ResultTable, TimeSeries};

/// Outcome of resolving a selection specification
///
/// Holds indices into the table the specification was resolved against,
/// plus everything that could not be matched. Indices become stale as soon
/// as the table changes; resolve again instead of keeping them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    /// Matched table indices (table order, or caller order for explicit lists)
    indices: Vec<usize>,
    /// Number of positions or identifiers that matched nothing
    not_found_count: usize,
    /// Human-readable description of each unmatched item
    not_found: Vec<String>,
    /// 1-based positions requested more than once
    duplicates: Vec<i64>,
}

impl SelectionResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_indices(indices: Vec<usize>) -> Self {
        Self {
            indices,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    pub(crate) fn add_not_found(&mut self, count: usize, description: String) {
        self.not_found_count += count;
        self.not_found.push(description);
    }

    pub(crate) fn add_duplicate(&mut self, position: i64) {
        self.duplicates.push(position);
    }

    /// Matched indices
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of matched entries
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of unmatched positions or identifiers
    pub fn not_found_count(&self) -> usize {
        self.not_found_count
    }

    /// Descriptions of unmatched items
    pub fn not_found(&self) -> &[String] {
        &self.not_found
    }

    /// Positions requested more than once
    pub fn duplicates(&self) -> &[i64] {
        &self.duplicates
    }

    /// Whether some requested item was not found, or nothing matched at all
    pub fn has_missing(&self) -> bool {
        self.is_empty() || self.not_found_count > 0
    }

    /// Matched entries, in result order
    ///
    /// `table` must be the table this result was resolved against.
    pub fn entries<'t>(&self, table: &'t ResultTable) -> Vec<&'t TimeSeries> {
        self.indices.iter().filter_map(|&i| table.get(i)).collect()
    }

    /// Matched indices, highest first
    ///
    /// Removing entries in this order leaves the remaining indices valid.
    pub fn indices_descending(&self) -> Vec<usize> {
        let mut indices = self.indices.clone();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        indices
    }
}
