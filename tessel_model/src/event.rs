// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change and lifecycle notifications.
//!
//! Every [`Model`] owns a small observer channel. Listeners registered on the
//! model type see the events of every instance and run first; listeners
//! subscribed on an instance run afterwards, in subscription order.
//!
//! Delivery is synchronous. When a listener runs, the instance already holds
//! its post-assignment state.

use core::fmt;
use std::sync::Arc;

use tessel_property::Value;

use crate::model::Model;

/// A notification emitted by a model instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelEvent<'a> {
    /// One property changed value.
    PropertyChanged {
        /// The property name.
        property: &'a str,
        /// The stored value after the change, `None` when unset.
        new_value: Option<&'a Value>,
        /// The stored value before the change, `None` when it was unset.
        old_value: Option<&'a Value>,
    },
    /// The instance changed. Emitted once per single-property assignment and
    /// once per bulk assignment that changed anything.
    ModelChanged,
    /// A fresh instance was constructed and its defaults applied.
    Created,
    /// An instance was rebuilt from its serialized form.
    Unserialized,
}

impl ModelEvent<'_> {
    /// Returns the event kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PropertyChanged { .. } => EventKind::PropertyChanged,
            Self::ModelChanged => EventKind::ModelChanged,
            Self::Created => EventKind::Created,
            Self::Unserialized => EventKind::Unserialized,
        }
    }

    /// Returns the changed property for [`ModelEvent::PropertyChanged`].
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::PropertyChanged { property, .. } => Some(*property),
            _ => None,
        }
    }
}

/// The closed set of event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`ModelEvent::PropertyChanged`].
    PropertyChanged,
    /// See [`ModelEvent::ModelChanged`].
    ModelChanged,
    /// See [`ModelEvent::Created`].
    Created,
    /// See [`ModelEvent::Unserialized`].
    Unserialized,
}

impl EventKind {
    /// Returns the event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PropertyChanged => "propertyChanged",
            Self::ModelChanged => "modelChanged",
            Self::Created => "created",
            Self::Unserialized => "unserialized",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A listener registered on a model type.
pub type TypeListener = Arc<dyn Fn(&Model, &ModelEvent<'_>) + Send + Sync>;

type InstanceListener = Box<dyn FnMut(&Model, &ModelEvent<'_>) + Send + Sync>;

/// Handle returned by [`Model::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listeners subscribed on one instance.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, InstanceListener)>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: InstanceListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn dispatch(&mut self, model: &Model, event: &ModelEvent<'_>) {
        for (_, listener) in &mut self.entries {
            listener(model, event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish_non_exhaustive()
    }
}
