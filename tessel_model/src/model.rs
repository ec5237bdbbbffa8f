// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model instances.

use core::any::Any;
use core::fmt;
use core::mem;
use std::sync::Arc;

use tracing::trace;

use tessel_property::{
    Assignment, CustomValue, Map, PropertyDefinition, PropertyHost, PropertyId, PropertyStore,
    Validatable, ValidationError, Validity, Value,
};

use crate::error::ModelError;
use crate::event::{Listeners, ModelEvent, SubscriptionId};
use crate::model_type::ModelType;

/// How a bulk assignment treats declared properties missing from its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignMode {
    /// Missing properties are unset.
    Replace,
    /// Missing properties are left untouched.
    Update,
}

/// An instance of a [`ModelType`].
///
/// Values are held in declaration order and converted on assignment. Every
/// real change is reported to listeners as a [`ModelEvent`].
///
/// # Example
///
/// ```rust
/// use tessel_model::{AssignMode, ModelType, PropertyKind};
/// use serde_json::json;
///
/// let person = ModelType::define("Person", |t| {
///     t.add_property("firstName", PropertyKind::String)?;
///     t.add_property("lastName", PropertyKind::String)?;
///     Ok(())
/// })
/// .unwrap();
///
/// let mut model = person.create(json!({ "firstName": "Jean", "lastName": "Dupont" })).unwrap();
/// model.set_value(json!({ "lastName": "Durand" }), AssignMode::Update).unwrap();
/// assert_eq!(model.to_json(), json!({ "firstName": "Jean", "lastName": "Durand" }));
///
/// model.set_value(json!({ "lastName": "Durand" }), AssignMode::Replace).unwrap();
/// assert_eq!(model.to_json(), json!({ "lastName": "Durand" }));
/// ```
pub struct Model {
    model_type: Arc<ModelType>,
    store: PropertyStore,
    listeners: Listeners,
}

impl Model {
    pub(crate) fn new(model_type: Arc<ModelType>) -> Self {
        Self {
            model_type,
            store: PropertyStore::new(),
            listeners: Listeners::default(),
        }
    }

    /// Returns the type of this instance.
    #[must_use]
    #[inline]
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Returns `true` if this instance's type is `model_type` or derives from it.
    #[must_use]
    pub fn is_instance_of(&self, model_type: &Arc<ModelType>) -> bool {
        self.model_type.is_subtype_of(model_type)
    }

    pub(crate) fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Returns the stored value of `name`, `None` when unset or undeclared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        let id = self.model_type.properties().by_name(name)?;
        self.store.get(id)
    }

    /// Returns `true` if `name` is declared and holds a value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates the set properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        let properties = self.model_type.properties();
        self.store
            .iter()
            .filter_map(move |(id, value)| properties.get(id).map(|p| (p.name(), value)))
    }

    /// Assigns a single property.
    ///
    /// The value is converted by the property's converter; `Null` unsets it.
    /// When the stored value actually changes, [`ModelEvent::PropertyChanged`]
    /// then [`ModelEvent::ModelChanged`] are emitted.
    ///
    /// Returns whether the stored value changed.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownProperty`] for undeclared names and
    /// [`ModelError::Conversion`] when conversion fails. The stored value is
    /// left untouched on error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<bool, ModelError> {
        let model_type = Arc::clone(&self.model_type);
        let (id, definition) = model_type
            .lookup(name)
            .ok_or_else(|| ModelError::UnknownProperty(name.to_owned()))?;
        let changed = self.set_property(id, definition, value.into())?;
        if changed {
            self.emit(&ModelEvent::ModelChanged);
        }
        Ok(changed)
    }

    /// Edits a single property through a closure.
    ///
    /// `edit` receives a copy of the stored value, `Null` when unset. The
    /// edited value is then assigned as by [`Model::set`]: it is converted,
    /// `Null` unsets the property, and events fire only on a real change.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownProperty`] for undeclared names and
    /// [`ModelError::Conversion`] when the edited value cannot be converted.
    /// The stored value is left untouched on error.
    pub fn update_with(
        &mut self,
        name: &str,
        edit: impl FnOnce(&mut Value),
    ) -> Result<bool, ModelError> {
        let model_type = Arc::clone(&self.model_type);
        let (id, definition) = model_type
            .lookup(name)
            .ok_or_else(|| ModelError::UnknownProperty(name.to_owned()))?;
        let mut value = self.store.get(id).cloned().unwrap_or_default();
        edit(&mut value);
        let changed = self.set_property(id, definition, value)?;
        if changed {
            self.emit(&ModelEvent::ModelChanged);
        }
        Ok(changed)
    }

    /// Unsets a single property. See [`Model::set`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownProperty`] for undeclared names.
    pub fn unset(&mut self, name: &str) -> Result<bool, ModelError> {
        self.set(name, Value::Null)
    }

    /// Assigns every declared property from `source`.
    ///
    /// `source` must be an object or `Null`. Properties are visited in
    /// declaration order and keys the type does not declare are ignored. At
    /// most one [`ModelEvent::ModelChanged`] is emitted, after the
    /// per-property events, and only when something changed.
    ///
    /// Returns whether any stored value changed.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SourceNotObject`] for other sources, and
    /// [`ModelError::Conversion`] when a value cannot be converted. A
    /// conversion error stops the assignment: earlier properties keep their
    /// new values and no aggregate event is emitted.
    pub fn set_value(&mut self, source: impl Into<Value>, mode: AssignMode) -> Result<bool, ModelError> {
        let mut source = match source.into() {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => return Err(ModelError::SourceNotObject(other.kind_name())),
        };

        let model_type = Arc::clone(&self.model_type);
        let mut changed = 0_usize;
        for (id, definition) in model_type.properties().iter() {
            let raw = match (source.as_mut().and_then(|map| map.swap_remove(definition.name())), mode) {
                (Some(raw), _) => raw,
                (None, AssignMode::Replace) => Value::Null,
                (None, AssignMode::Update) => continue,
            };
            if self.set_property(id, definition, raw)? {
                changed += 1;
            }
        }

        trace!(model = model_type.name(), ?mode, changed, "bulk assignment");
        if changed > 0 {
            self.emit(&ModelEvent::ModelChanged);
        }
        Ok(changed > 0)
    }

    /// Shorthand for [`Model::set_value`] in [`AssignMode::Replace`].
    ///
    /// # Errors
    ///
    /// See [`Model::set_value`].
    pub fn replace_value(&mut self, source: impl Into<Value>) -> Result<bool, ModelError> {
        self.set_value(source, AssignMode::Replace)
    }

    /// Shorthand for [`Model::set_value`] in [`AssignMode::Update`].
    ///
    /// # Errors
    ///
    /// See [`Model::set_value`].
    pub fn update_value(&mut self, source: impl Into<Value>) -> Result<bool, ModelError> {
        self.set_value(source, AssignMode::Update)
    }

    /// Unsets every property.
    pub fn clear_value(&mut self) -> bool {
        let model_type = Arc::clone(&self.model_type);
        let mut changed = false;
        for (id, definition) in model_type.properties().iter() {
            if let Assignment::Changed { previous } = self.store.assign(id, None) {
                self.emit_property_changed(id, definition.name(), previous);
                changed = true;
            }
        }
        trace!(model = model_type.name(), changed, "values cleared");
        if changed {
            self.emit(&ModelEvent::ModelChanged);
        }
        changed
    }

    /// Assigns default values to every unset property that declares one.
    ///
    /// Each default goes through the single-property path: it is converted and
    /// emits [`ModelEvent::PropertyChanged`], but no aggregate event.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Conversion`] when a default cannot be converted.
    pub fn apply_default_values(&mut self) -> Result<(), ModelError> {
        let model_type = Arc::clone(&self.model_type);
        for (id, definition) in model_type.properties().iter() {
            if self.store.has(id) {
                continue;
            }
            let Some(value) = definition.default_for(&*self) else {
                continue;
            };
            self.set_property(id, definition, value)?;
        }
        Ok(())
    }

    /// Returns the plain representation of this instance.
    ///
    /// Set properties are written in declaration order through their
    /// serializers. Unset properties, and serializer results of `Null`, are
    /// omitted.
    #[must_use]
    pub fn serialize(&self) -> Value {
        Value::Object(self.serialize_map())
    }

    /// Returns [`Model::serialize`] as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.serialize().to_json()
    }

    /// Validates this instance. See [`Validatable::check_validity`].
    #[must_use]
    pub fn check_validity(&self) -> Validity {
        Validatable::check_validity(self)
    }

    /// Validates this instance and turns failures into an error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Failed`] carrying every reason.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validatable::validate(self)
    }

    /// Registers a listener for this instance's events.
    ///
    /// Instance listeners run after the type-level listeners, in
    /// subscription order. Clones do not inherit them.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Self, &ModelEvent<'_>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn serialize_map(&self) -> Map {
        let properties = self.model_type.properties();
        let mut out = Map::with_capacity(self.store.len());
        for (id, value) in self.store.iter() {
            let Some(definition) = properties.get(id) else {
                continue;
            };
            let serialized = definition.serialize(value);
            if !serialized.is_null() {
                out.insert(definition.name().to_owned(), serialized);
            }
        }
        out
    }

    fn set_property(
        &mut self,
        id: PropertyId,
        definition: &PropertyDefinition,
        raw: Value,
    ) -> Result<bool, ModelError> {
        let assignment = self
            .store
            .set(id, definition, raw)
            .map_err(|source| ModelError::Conversion {
                property: definition.name().to_owned(),
                source,
            })?;
        match assignment {
            Assignment::Unchanged => Ok(false),
            Assignment::Changed { previous } => {
                trace!(
                    model = self.model_type.name(),
                    property = definition.name(),
                    "property changed"
                );
                self.emit_property_changed(id, definition.name(), previous);
                Ok(true)
            }
        }
    }

    fn emit_property_changed(&mut self, id: PropertyId, property: &str, previous: Option<Value>) {
        let mut listeners = mem::take(&mut self.listeners);
        let event = ModelEvent::PropertyChanged {
            property,
            new_value: self.store.get(id),
            old_value: previous.as_ref(),
        };
        self.dispatch(&mut listeners, &event);
        self.listeners = listeners;
    }

    pub(crate) fn emit(&mut self, event: &ModelEvent<'_>) {
        let mut listeners = mem::take(&mut self.listeners);
        self.dispatch(&mut listeners, event);
        self.listeners = listeners;
    }

    fn dispatch(&self, listeners: &mut Listeners, event: &ModelEvent<'_>) {
        for listener in self.model_type.listeners() {
            listener(self, event);
        }
        listeners.dispatch(self, event);
    }
}

impl PropertyHost for Model {
    fn property_value(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Validatable for Model {
    fn check_validity_at(&self, path: &str) -> Validity {
        self.model_type.validators().check_subject(self, path)
    }
}

impl CustomValue for Model {
    fn type_name(&self) -> &str {
        self.model_type.name()
    }

    fn serialize(&self) -> Option<Value> {
        Some(Value::Object(self.serialize_map()))
    }

    fn clone_boxed(&self) -> Box<dyn CustomValue> {
        Box::new(self.clone())
    }

    fn eq_custom(&self, other: &dyn CustomValue) -> bool {
        other.downcast_ref::<Self>().is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_validatable(&self) -> Option<&dyn Validatable> {
        Some(self)
    }
}

impl Clone for Model {
    fn clone(&self) -> Self {
        Self {
            model_type: Arc::clone(&self.model_type),
            store: self.store.clone(),
            listeners: Listeners::default(),
        }
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model_type, &other.model_type) && self.store == other.store
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.model_type.name())
            .field("values", &self.store)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl serde::Serialize for Model {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&Value::Object(self.serialize_map()), serializer)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Self::Custom(Box::new(model))
    }
}
