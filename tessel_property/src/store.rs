// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance sparse property storage.
//!
//! This module provides [`PropertyStore`], which holds the converted values of
//! one model instance.
//!
//! # Implementation
//!
//! Entries live in a vector sorted by [`PropertyId`] and are found by binary
//! search rather than through a hash map. Ids follow declaration order, so
//! iterating the store visits set properties in declaration order. The first
//! entries are stored inline via `SmallVec`.
//!
//! An unset property has no entry. Storing `Null` removes the entry.

use smallvec::SmallVec;

use crate::definition::PropertyDefinition;
use crate::error::ConversionError;
use crate::id::PropertyId;
use crate::value::Value;

/// Default inline capacity for property entries.
const INLINE_CAPACITY: usize = 8;

/// The effect of an assignment.
#[derive(Clone, Debug, PartialEq)]
pub enum Assignment {
    /// The stored value already equals the converted input.
    Unchanged,
    /// The stored value was replaced, inserted, or removed.
    Changed {
        /// The value stored before, if the property was set.
        previous: Option<Value>,
    },
}

impl Assignment {
    /// Returns `true` for [`Assignment::Changed`].
    #[must_use]
    #[inline]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Sparse storage for the property values of one instance.
///
/// # Example
///
/// ```rust
/// use tessel_property::{Assignment, PropertyDefinition, PropertyKind, PropertySet, PropertyStore, Value};
///
/// let mut set = PropertySet::new();
/// let age = set.register(PropertyDefinition::new("age", PropertyKind::Number).unwrap()).unwrap();
/// let definition = set.get(age).unwrap();
///
/// let mut store = PropertyStore::new();
/// let first = store.set(age, definition, Value::from("30")).unwrap();
/// assert_eq!(first, Assignment::Changed { previous: None });
/// assert_eq!(store.get(age), Some(&Value::from(30)));
///
/// // Assigning the same converted value is not a change.
/// assert_eq!(store.set(age, definition, Value::from(30)).unwrap(), Assignment::Unchanged);
///
/// // Null unsets.
/// assert!(store.set(age, definition, Value::Null).unwrap().is_changed());
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyStore {
    /// Entries sorted by [`PropertyId`] for binary search lookup.
    entries: SmallVec<[(PropertyId, Value); INLINE_CAPACITY]>,
}

impl PropertyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no property is set.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of set properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates set properties in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &Value)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    #[inline]
    fn find_entry(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Gets the stored value, if set.
    #[must_use]
    #[inline]
    pub fn get(&self, id: PropertyId) -> Option<&Value> {
        self.find_entry(id).ok().map(|idx| &self.entries[idx].1)
    }

    /// Gets the stored value mutably, if set.
    ///
    /// Changes made through this reference bypass conversion and change
    /// detection.
    #[must_use]
    pub fn get_mut(&mut self, id: PropertyId) -> Option<&mut Value> {
        self.find_entry(id).ok().map(|idx| &mut self.entries[idx].1)
    }

    /// Returns `true` if the property is set.
    #[must_use]
    #[inline]
    pub fn has(&self, id: PropertyId) -> bool {
        self.find_entry(id).is_ok()
    }

    /// Converts `raw` through `definition` and stores it.
    ///
    /// `Null` bypasses conversion and unsets the property.
    ///
    /// # Errors
    ///
    /// Returns the converter's error; the store is left untouched.
    pub fn set(
        &mut self,
        id: PropertyId,
        definition: &PropertyDefinition,
        raw: Value,
    ) -> Result<Assignment, ConversionError> {
        let value = if raw.is_null() {
            None
        } else {
            Some(definition.convert(raw)?)
        };
        Ok(self.assign(id, value))
    }

    /// Stores an already converted value, or unsets with `None`.
    pub fn assign(&mut self, id: PropertyId, value: Option<Value>) -> Assignment {
        match (self.find_entry(id), value) {
            (Ok(idx), Some(value)) => {
                if self.entries[idx].1 == value {
                    Assignment::Unchanged
                } else {
                    let previous = core::mem::replace(&mut self.entries[idx].1, value);
                    Assignment::Changed {
                        previous: Some(previous),
                    }
                }
            }
            (Ok(idx), None) => {
                let (_, previous) = self.entries.remove(idx);
                Assignment::Changed {
                    previous: Some(previous),
                }
            }
            (Err(idx), Some(value)) => {
                self.entries.insert(idx, (id, value));
                Assignment::Changed { previous: None }
            }
            (Err(_), None) => Assignment::Unchanged,
        }
    }

    /// Removes a value without conversion or notification.
    ///
    /// Returns the removed value.
    pub fn remove(&mut self, id: PropertyId) -> Option<Value> {
        self.find_entry(id)
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
