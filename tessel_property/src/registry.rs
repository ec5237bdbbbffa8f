// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered set of properties a model type declares.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::trace;

use crate::definition::PropertyDefinition;
use crate::error::DefinitionError;
use crate::id::PropertyId;

/// Declared properties in declaration order.
///
/// Definitions are shared behind [`Arc`] so that derived sets (a subtype
/// extending its parent, for instance) do not copy them. Lookup works by name
/// or by [`PropertyId`].
///
/// # Example
///
/// ```rust
/// use tessel_property::{PropertyDefinition, PropertyKind, PropertySet};
///
/// let mut set = PropertySet::new();
/// let first = set.register(PropertyDefinition::new("firstName", PropertyKind::String).unwrap()).unwrap();
/// set.register(PropertyDefinition::new("lastName", PropertyKind::String).unwrap()).unwrap();
///
/// assert_eq!(set.by_name("firstName"), Some(first));
/// let names: Vec<_> = set.iter().map(|(_, p)| p.name()).collect();
/// assert_eq!(names, ["firstName", "lastName"]);
/// ```
#[derive(Clone, Default)]
pub struct PropertySet {
    definitions: Vec<Arc<PropertyDefinition>>,
    by_name: HashMap<String, PropertyId>,
}

impl PropertySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition and returns its id.
    ///
    /// A definition whose name is already registered replaces the previous
    /// one in place and keeps its id, so declaration order is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::TooManyProperties`] when the set is full.
    pub fn register(&mut self, definition: PropertyDefinition) -> Result<PropertyId, DefinitionError> {
        self.register_shared(Arc::new(definition))
    }

    /// Registers a shared definition. See [`PropertySet::register`].
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::TooManyProperties`] when the set is full.
    pub fn register_shared(
        &mut self,
        definition: Arc<PropertyDefinition>,
    ) -> Result<PropertyId, DefinitionError> {
        if let Some(&id) = self.by_name.get(definition.name()) {
            trace!(property = definition.name(), "property redeclared");
            self.definitions[usize::from(id.index())] = definition;
            return Ok(id);
        }
        let Ok(index) = u16::try_from(self.definitions.len()) else {
            return Err(DefinitionError::TooManyProperties {
                max: usize::from(u16::MAX),
            });
        };
        let id = PropertyId::new(index);
        self.by_name.insert(definition.name().to_owned(), id);
        self.definitions.push(definition);
        Ok(id)
    }

    /// Returns the number of properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if no property is declared.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Looks up a property id by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// Returns the definition for `id`.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&Arc<PropertyDefinition>> {
        self.definitions.get(usize::from(id.index()))
    }

    /// Returns the definition named `name`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<PropertyDefinition>> {
        self.by_name(name).and_then(|id| self.get(id))
    }

    /// Iterates definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &Arc<PropertyDefinition>)> {
        self.definitions.iter().enumerate().map(|(i, definition)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len <= u16::MAX")]
            let index = i as u16;
            (PropertyId::new(index), definition)
        })
    }
}

impl core::fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertySet")
            .field("count", &self.definitions.len())
            .field(
                "properties",
                &self.definitions.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
