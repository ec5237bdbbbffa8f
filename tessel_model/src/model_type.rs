// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model types.
//!
//! A [`ModelType`] is the schema shared by its instances: the declared
//! properties in declaration order, model-level validators, and type-level
//! listeners. Types are defined once through a [`ModelTypeBuilder`] and are
//! immutable afterwards.

use core::fmt;
use std::sync::Arc;

use tracing::debug;

use tessel_property::{
    ClassType, ConversionError, DefinitionError, PropertyDefinition, PropertyId, PropertyKind,
    PropertyOptions, PropertySet, Validator, Validators, Validity, Value,
};

use crate::error::ModelError;
use crate::event::{ModelEvent, TypeListener};
use crate::model::Model;

/// Name of the validator every root model type installs.
pub const MODEL_VALIDATOR: &str = "modelValidator";

/// The schema of a family of model instances.
///
/// # Example
///
/// ```rust
/// use tessel_model::{ModelType, PropertyKind, PropertyOptions};
/// use serde_json::json;
///
/// let person = ModelType::define("Person", |t| {
///     t.add_property("name", PropertyKind::String)?;
///     t.add_property_with("isAlive", PropertyKind::Boolean, PropertyOptions::new().default_value(true))?;
///     Ok(())
/// })
/// .unwrap();
///
/// let created = person.create(json!({ "name": "Dupont" })).unwrap();
/// assert_eq!(created.to_json(), json!({ "name": "Dupont", "isAlive": true }));
///
/// let restored = person.unserialize(json!({ "name": "Dupont" })).unwrap();
/// assert_eq!(restored.to_json(), json!({ "name": "Dupont" }));
/// ```
pub struct ModelType {
    name: String,
    parent: Option<Arc<ModelType>>,
    properties: PropertySet,
    validators: Validators<Model>,
    listeners: Vec<TypeListener>,
}

impl ModelType {
    /// Defines a root model type.
    ///
    /// `body` declares properties, validators, and listeners. The model
    /// validator, which validates every declared property under its path, is
    /// installed before `body` runs.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::MissingArgument`] for an empty name and
    /// propagates any error `body` returns.
    pub fn define(
        name: &str,
        body: impl FnOnce(&mut ModelTypeBuilder) -> Result<(), ModelError>,
    ) -> Result<Arc<Self>, ModelError> {
        let mut validators = Validators::new();
        validators.add(model_validator());
        let builder = ModelTypeBuilder {
            name: name.to_owned(),
            parent: None,
            properties: PropertySet::new(),
            validators,
            listeners: Vec::new(),
        };
        builder.finish(body)
    }

    /// Defines a subtype of `self`.
    ///
    /// The subtype starts with the properties (in the parent's order),
    /// validators, and listeners of `self`. Redeclaring a property replaces
    /// the inherited definition in place.
    ///
    /// # Errors
    ///
    /// Same as [`ModelType::define`].
    pub fn extend(
        self: &Arc<Self>,
        name: &str,
        body: impl FnOnce(&mut ModelTypeBuilder) -> Result<(), ModelError>,
    ) -> Result<Arc<Self>, ModelError> {
        let builder = ModelTypeBuilder {
            name: name.to_owned(),
            parent: Some(Arc::clone(self)),
            properties: self.properties.clone(),
            validators: self.validators.clone(),
            listeners: self.listeners.clone(),
        };
        builder.finish(body)
    }

    /// Returns the type name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type this one extends.
    #[must_use]
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns `true` if `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Arc<Self>) -> bool {
        if core::ptr::eq(self, Arc::as_ptr(other)) {
            return true;
        }
        let mut current = self.parent.as_ref();
        while let Some(ancestor) = current {
            if Arc::ptr_eq(ancestor, other) {
                return true;
            }
            current = ancestor.parent.as_ref();
        }
        false
    }

    /// Returns the declared properties.
    #[must_use]
    #[inline]
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Returns the definition of `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get_by_name(name).map(AsRef::as_ref)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<(PropertyId, &Arc<PropertyDefinition>)> {
        let id = self.properties.by_name(name)?;
        Some((id, self.properties.get(id)?))
    }

    /// Returns the model-level validators.
    #[must_use]
    #[inline]
    pub fn validators(&self) -> &Validators<Model> {
        &self.validators
    }

    /// Returns the type-level listeners in registration order.
    #[must_use]
    #[inline]
    pub fn listeners(&self) -> &[TypeListener] {
        &self.listeners
    }

    /// Returns the property kind that nests instances of this type.
    ///
    /// Plain values assigned to such a property are rebuilt through
    /// [`ModelType::unserialize`].
    #[must_use]
    pub fn kind(self: &Arc<Self>) -> PropertyKind {
        PropertyKind::Model(Arc::new(ModelClass(Arc::clone(self))))
    }

    /// Creates a fresh instance.
    ///
    /// `source` is assigned in update mode, defaults are applied to the
    /// properties left unset, then [`ModelEvent::Created`] is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SourceNotObject`] or [`ModelError::Conversion`]
    /// when `source` cannot be assigned.
    pub fn create(self: &Arc<Self>, source: impl Into<Value>) -> Result<Model, ModelError> {
        let mut model = Model::new(Arc::clone(self));
        model.update_value(source)?;
        model.apply_default_values()?;
        model.emit(&ModelEvent::Created);
        Ok(model)
    }

    /// Creates a fresh instance with no initial values.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Conversion`] when a default cannot be converted.
    pub fn create_empty(self: &Arc<Self>) -> Result<Model, ModelError> {
        self.create(Value::Null)
    }

    /// Rebuilds an instance from its serialized form.
    ///
    /// Unlike [`ModelType::create`], defaults are not applied. Emits
    /// [`ModelEvent::Unserialized`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SourceNotObject`] or [`ModelError::Conversion`]
    /// when `json` cannot be assigned.
    pub fn unserialize(self: &Arc<Self>, json: impl Into<Value>) -> Result<Model, ModelError> {
        let mut model = Model::new(Arc::clone(self));
        model.update_value(json)?;
        model.emit(&ModelEvent::Unserialized);
        Ok(model)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("properties", &self.properties)
            .field("validators", &self.validators)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Collects the declarations of a model type.
pub struct ModelTypeBuilder {
    name: String,
    parent: Option<Arc<ModelType>>,
    properties: PropertySet,
    validators: Validators<Model>,
    listeners: Vec<TypeListener>,
}

impl ModelTypeBuilder {
    fn finish(
        mut self,
        body: impl FnOnce(&mut Self) -> Result<(), ModelError>,
    ) -> Result<Arc<ModelType>, ModelError> {
        if self.name.is_empty() {
            return Err(DefinitionError::MissingArgument("name").into());
        }
        body(&mut self)?;
        debug!(
            model = self.name.as_str(),
            parent = self.parent.as_ref().map(|p| p.name()),
            properties = self.properties.len(),
            "model type defined"
        );
        Ok(Arc::new(ModelType {
            name: self.name,
            parent: self.parent,
            properties: self.properties,
            validators: self.validators,
            listeners: self.listeners,
        }))
    }

    /// Returns the name of the type being defined.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a property with no options.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Definition`] if the declaration is rejected.
    pub fn add_property(&mut self, name: &str, kind: PropertyKind) -> Result<PropertyId, ModelError> {
        self.add_property_with(name, kind, PropertyOptions::new())
    }

    /// Declares a property.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Definition`] if `name` is empty or an option is
    /// rejected.
    pub fn add_property_with(
        &mut self,
        name: &str,
        kind: PropertyKind,
        options: PropertyOptions,
    ) -> Result<PropertyId, ModelError> {
        self.add_definition(PropertyDefinition::create(name, Some(kind), options)?)
    }

    /// Declares a property from a prepared definition.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Definition`] when the type is full.
    pub fn add_definition(&mut self, definition: PropertyDefinition) -> Result<PropertyId, ModelError> {
        Ok(self.properties.register(definition)?)
    }

    /// Appends a model-level validator.
    pub fn add_validator(&mut self, validator: Validator<Model>) {
        self.validators.add(validator);
    }

    /// Registers a listener for the events of every instance.
    pub fn on_event(&mut self, listener: impl Fn(&Model, &ModelEvent<'_>) + Send + Sync + 'static) {
        self.listeners.push(Arc::new(listener));
    }

    /// Returns the definition of a property declared so far.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get_by_name(name).map(AsRef::as_ref)
    }
}

impl fmt::Debug for ModelTypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelTypeBuilder")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Validates every declared property under `parent.name`.
fn model_validator() -> Validator<Model> {
    Validator::structured(MODEL_VALIDATOR, |model: &Model, path: &str| {
        let mut validity = Validity::valid();
        for (id, definition) in model.model_type().properties().iter() {
            let property_path = if path.is_empty() {
                definition.name().to_owned()
            } else {
                format!("{path}.{}", definition.name())
            };
            validity.merge(definition.check_validity(model.store().get(id), &property_path));
        }
        validity
    })
}

/// Adapts a [`ModelType`] to the [`ClassType`] seam of property kinds.
#[derive(Debug)]
struct ModelClass(Arc<ModelType>);

impl ClassType for ModelClass {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn is_instance(&self, value: &Value) -> bool {
        value
            .downcast_ref::<Model>()
            .is_some_and(|model| model.is_instance_of(&self.0))
    }

    fn construct(&self, raw: Value) -> Result<Value, ConversionError> {
        self.0
            .unserialize(raw)
            .map(Value::from)
            .map_err(|err| ConversionError::Construct {
                type_name: self.0.name().to_owned(),
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Arc<ModelType> {
        ModelType::define("Person", |t| {
            t.add_property("firstName", PropertyKind::String)?;
            t.add_property("lastName", PropertyKind::String)?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn define_requires_a_name() {
        assert_eq!(
            ModelType::define("", |_| Ok(())).unwrap_err(),
            ModelError::Definition(DefinitionError::MissingArgument("name"))
        );
    }

    #[test]
    fn declaration_errors_abort_the_definition() {
        let err = ModelType::define("Broken", |t| {
            t.add_property_with(
                "age",
                PropertyKind::Number,
                PropertyOptions::new().raw("colour", json!("red")),
            )?;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::Definition(DefinitionError::UnknownOption("colour".into()))
        );
    }

    #[test]
    fn root_types_install_the_model_validator() {
        let person = person();
        let names: Vec<_> = person.validators().iter().map(Validator::name).collect();
        assert_eq!(names, [MODEL_VALIDATOR]);
        assert_eq!(person.property("lastName").map(|p| p.kind().name()), Some("string"));
        assert!(person.property("age").is_none());
    }

    #[test]
    fn subtypes_inherit_and_override() {
        let person = person();
        let employee = person
            .extend("Employee", |t| {
                t.add_property("company", PropertyKind::String)?;
                t.add_property("firstName", PropertyKind::Number)?;
                Ok(())
            })
            .unwrap();

        let names: Vec<_> = employee.properties().iter().map(|(_, p)| p.name()).collect();
        assert_eq!(names, ["firstName", "lastName", "company"]);
        assert_eq!(employee.property("firstName").map(|p| p.kind().name()), Some("number"));
        assert_eq!(person.property("firstName").map(|p| p.kind().name()), Some("string"));
        assert_eq!(employee.validators().len(), 1);

        assert!(employee.is_subtype_of(&person));
        assert!(employee.is_subtype_of(&employee));
        assert!(!person.is_subtype_of(&employee));
        assert_eq!(employee.parent().map(|p| p.name()), Some("Person"));
    }

    #[test]
    fn model_kind_rebuilds_plain_values() {
        let person = person();
        let kind = person.kind();
        assert_eq!(kind.name(), "Person");

        let convert = kind.converter();
        let nested = convert(Value::from(json!({ "lastName": "Dupont" }))).unwrap();
        let model = nested.downcast_ref::<Model>().unwrap();
        assert!(model.is_instance_of(&person));
        assert_eq!(model.get("lastName"), Some(&Value::from("Dupont")));

        assert!(matches!(
            convert(Value::from("Dupont")),
            Err(ConversionError::Construct { .. })
        ));
    }
}
