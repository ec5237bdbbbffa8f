// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative model types.
//!
//! A schema document maps property names to option objects:
//!
//! ```json
//! {
//!   "name": { "type": "string", "validators": "isFilled" },
//!   "age": { "type": "number", "defaultValue": 0, "validators": ["isRequired", "isPositive"] },
//!   "employer": { "type": "Company" }
//! }
//! ```
//!
//! Option keys are checked like [`PropertyOptions`]. A `type` naming one of
//! the known model types declares a nested model property.

use std::sync::Arc;

use tessel_property::{PropertyDefinition, PropertyOptions};

use crate::error::ModelError;
use crate::model_type::{ModelType, ModelTypeBuilder};

impl ModelType {
    /// Defines a root model type from a schema document.
    ///
    /// `known` lists the model types a `type` option may name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidSchema`] when the document or a property
    /// entry is not an object, and [`ModelError::Definition`] when a
    /// declaration is rejected.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessel_model::ModelType;
    /// use serde_json::json;
    ///
    /// let person = ModelType::from_schema(
    ///     "Person",
    ///     &json!({ "name": { "type": "string" }, "age": { "type": "number", "defaultValue": 18 } }),
    ///     &[],
    /// )
    /// .unwrap();
    ///
    /// let model = person.create(json!({ "name": "Dupont" })).unwrap();
    /// assert_eq!(model.to_json(), json!({ "name": "Dupont", "age": 18 }));
    /// ```
    pub fn from_schema(
        name: &str,
        schema: &serde_json::Value,
        known: &[Arc<Self>],
    ) -> Result<Arc<Self>, ModelError> {
        let properties = schema_object(schema, "schema")?;
        Self::define(name, |builder| declare(builder, properties, known))
    }

    /// Defines a subtype of `self` from a schema document.
    ///
    /// # Errors
    ///
    /// Same as [`ModelType::from_schema`].
    pub fn extend_from_schema(
        self: &Arc<Self>,
        name: &str,
        schema: &serde_json::Value,
        known: &[Arc<Self>],
    ) -> Result<Arc<Self>, ModelError> {
        let properties = schema_object(schema, "schema")?;
        self.extend(name, |builder| declare(builder, properties, known))
    }
}

fn schema_object<'a>(
    value: &'a serde_json::Value,
    what: &str,
) -> Result<&'a serde_json::Map<String, serde_json::Value>, ModelError> {
    value.as_object().ok_or_else(|| {
        let found = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        ModelError::InvalidSchema(format!("{what} must be an object, found {found}"))
    })
}

fn declare(
    builder: &mut ModelTypeBuilder,
    properties: &serde_json::Map<String, serde_json::Value>,
    known: &[Arc<ModelType>],
) -> Result<(), ModelError> {
    for (property, entry) in properties {
        let entry = schema_object(entry, &format!("property '{property}'"))?;
        let mut options = PropertyOptions::new();
        for (key, value) in entry {
            let nested = match (key.as_str(), value.as_str()) {
                ("type", Some(type_name)) => known.iter().find(|t| t.name() == type_name),
                _ => None,
            };
            options = match nested {
                Some(model_type) => options.kind(model_type.kind()),
                None => options.raw(key.as_str(), value.clone()),
            };
        }
        builder.add_definition(PropertyDefinition::create(property, None, options)?)?;
    }
    Ok(())
}
