//! Property storage

use ahash::AHashMap;

use crate::error::{PropError, PropResult};
use crate::expand::{self, Expansion};
use crate::value::{PropType, PropValue};

/// Process-wide property store
///
/// Owned by the processor for the duration of a run; commands reach it
/// through requests rather than holding it directly.
#[derive(Debug, Default, Clone)]
pub struct PropertyStore {
    values: AHashMap<String, PropValue>,
}

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Get a property, failing if it is not defined
    pub fn require(&self, name: &str) -> PropResult<&PropValue> {
        self.get(name)
            .ok_or_else(|| PropError::NotFound(name.to_string()))
    }

    /// Get a date/time property
    pub fn get_datetime(&self, name: &str) -> PropResult<Option<chrono::NaiveDateTime>> {
        match self.get(name) {
            None => Ok(None),
            Some(PropValue::DateTime(dt)) => Ok(Some(*dt)),
            Some(other) => Err(PropError::TypeMismatch {
                expected: PropType::DateTime.name(),
                actual: other.prop_type().name(),
            }),
        }
    }

    /// Set a property, returning the previous value
    pub fn set(&mut self, name: &str, value: PropValue) -> PropResult<Option<PropValue>> {
        validate_name(name)?;
        log::debug!("property {} = {}", name, value);
        Ok(self.values.insert(name.to_string(), value))
    }

    /// Remove a property, returning its value
    pub fn unset(&mut self, name: &str) -> Option<PropValue> {
        self.values.remove(name)
    }

    /// Check if a property is defined
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Property names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expand `${Name}` references in `input`
    ///
    /// Missing names are left in place and listed in the returned
    /// [`Expansion`]; reporting them is up to the caller.
    pub fn expand(&self, input: &str) -> Expansion {
        expand::expand(self, input)
    }

    /// Whether `input` contains a `${Name}` reference
    pub fn has_reference(input: &str) -> bool {
        expand::has_reference(input)
    }
}

fn validate_name(name: &str) -> PropResult<()> {
    if name.trim().is_empty() || name.contains("${") || name.contains('}') {
        return Err(PropError::InvalidName(name.to_string()));
    }
    Ok(())
}
