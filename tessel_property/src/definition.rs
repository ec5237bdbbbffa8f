// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property definitions.
//!
//! A [`PropertyDefinition`] bundles everything a model type knows about one of
//! its fields: the kind, the converter and serializer derived from it (or
//! overridden), the default value, and the validators. Definitions are
//! immutable once created and shared by every instance of the type.

use core::fmt;
use std::sync::Arc;

use crate::error::{ConversionError, DefinitionError};
use crate::kind::{Converter, PropertyKind, Serializer};
use crate::options::{OPTION_KEYS, OptionValue, PropertyOptions};
use crate::validation::{Validator, Validators, Validity};
use crate::value::Value;

/// Read access to the values of the instance a default is computed for.
pub trait PropertyHost {
    /// Returns the stored value of `name`, if set.
    fn property_value(&self, name: &str) -> Option<&Value>;
}

type ComputeFn = dyn Fn(&dyn PropertyHost) -> Value + Send + Sync;

/// The default value of a property.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value.
    Literal(Value),
    /// A value computed from the instance under construction.
    Computed(Arc<ComputeFn>),
}

impl DefaultValue {
    /// Produces the default for `host`.
    #[must_use]
    pub fn resolve(&self, host: &dyn PropertyHost) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Computed(compute) => compute(host),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// The declaration of one property.
///
/// # Example
///
/// ```rust
/// use tessel_property::{PropertyDefinition, PropertyKind, Value};
///
/// let age = PropertyDefinition::new("age", PropertyKind::Number).unwrap();
/// assert_eq!(age.convert(Value::from("42")).unwrap(), Value::from(42));
/// assert_eq!(age.serialize(&Value::from(42)), Value::from(42));
/// ```
#[derive(Clone)]
pub struct PropertyDefinition {
    name: String,
    kind: PropertyKind,
    converter: Converter,
    serializer: Serializer,
    default_value: Option<DefaultValue>,
    validators: Validators<Value>,
}

impl PropertyDefinition {
    /// Creates a definition with no options.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::MissingArgument`] if `name` is empty.
    pub fn new(name: &str, kind: PropertyKind) -> Result<Self, DefinitionError> {
        Self::create(name, Some(kind), PropertyOptions::new())
    }

    /// Creates a definition and applies `options` onto it.
    ///
    /// The kind may be given directly or through the `type` option; a `type`
    /// option wins. Converter and serializer are derived from the resulting
    /// kind, then the remaining options are applied in order.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::MissingArgument`] if `name` is empty or no kind is
    ///   given.
    /// - [`DefinitionError::UnknownOption`] for a key that is not a definition
    ///   attribute.
    /// - [`DefinitionError::InvalidOption`], [`DefinitionError::InvalidType`],
    ///   [`DefinitionError::UnknownValidator`] or
    ///   [`DefinitionError::InvalidValidator`] for option values that cannot be
    ///   applied.
    pub fn create(
        name: &str,
        kind: Option<PropertyKind>,
        options: PropertyOptions,
    ) -> Result<Self, DefinitionError> {
        if name.is_empty() {
            return Err(DefinitionError::MissingArgument("name"));
        }

        let mut entries = options.into_entries();
        if let Some((key, _)) = entries.iter().find(|(key, _)| !OPTION_KEYS.contains(&key.as_str())) {
            return Err(DefinitionError::UnknownOption(key.clone()));
        }

        let mut kind = kind;
        for (key, value) in &entries {
            if key == "type" {
                kind = Some(kind_option(value)?);
            }
        }
        let kind = kind.ok_or(DefinitionError::MissingArgument("type"))?;
        entries.retain(|(key, _)| key != "type");

        let mut definition = Self {
            name: name.to_owned(),
            converter: kind.converter(),
            serializer: kind.serializer(),
            kind,
            default_value: None,
            validators: Validators::new(),
        };
        for (key, value) in entries {
            definition.apply(&key, value)?;
        }
        Ok(definition)
    }

    fn apply(&mut self, key: &str, value: OptionValue) -> Result<(), DefinitionError> {
        match (key, value) {
            ("converter", OptionValue::Converter(converter)) => self.converter = converter,
            ("serializer", OptionValue::Serializer(serializer)) => self.serializer = serializer,
            ("defaultValue", OptionValue::Default(default)) => self.default_value = Some(default),
            ("defaultValue", OptionValue::Json(json)) => {
                self.default_value = (!json.is_null()).then(|| DefaultValue::Literal(json.into()));
            }
            ("validators", OptionValue::Validators(validators)) => self.validators = validators,
            ("validators", OptionValue::Json(json)) => {
                self.validators = Validators::from_json(&json)?;
            }
            (key, value) => {
                return Err(DefinitionError::InvalidOption {
                    option: key.to_owned(),
                    reason: format!("cannot take {value:?}"),
                });
            }
        }
        Ok(())
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property kind.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Returns the default value, if any.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default_value.as_ref()
    }

    /// Returns `true` if the property has a default value.
    #[must_use]
    #[inline]
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Returns the attached validators.
    #[must_use]
    #[inline]
    pub fn validators(&self) -> &Validators<Value> {
        &self.validators
    }

    /// Attaches another validator.
    pub fn add_validator(&mut self, validator: Validator<Value>) {
        self.validators.add(validator);
    }

    /// Converts a raw, non-null input to its stored form.
    ///
    /// # Errors
    ///
    /// Propagates the converter's [`ConversionError`].
    pub fn convert(&self, raw: Value) -> Result<Value, ConversionError> {
        (self.converter)(raw)
    }

    /// Serializes a stored value.
    #[must_use]
    pub fn serialize(&self, value: &Value) -> Value {
        (self.serializer)(value)
    }

    /// Resolves the default value for `host`. `Null` defaults mean none.
    #[must_use]
    pub fn default_for(&self, host: &dyn PropertyHost) -> Option<Value> {
        self.default_value
            .as_ref()
            .map(|default| default.resolve(host))
            .filter(|value| !value.is_null())
    }

    /// Validates a stored value located at `path`. Unset values are validated
    /// as `Null`.
    #[must_use]
    pub fn check_validity(&self, value: Option<&Value>, path: &str) -> Validity {
        match value {
            Some(value) => self.validators.check_validity(value, path),
            None => self.validators.check_validity(&Value::Null, path),
        }
    }
}

fn kind_option(value: &OptionValue) -> Result<PropertyKind, DefinitionError> {
    match value {
        OptionValue::Kind(kind) => Ok(kind.clone()),
        OptionValue::Json(serde_json::Value::String(name)) => PropertyKind::from_name(name),
        OptionValue::Json(serde_json::Value::Null) => Err(DefinitionError::MissingArgument("type")),
        other => Err(DefinitionError::InvalidOption {
            option: "type".to_owned(),
            reason: format!("cannot take {other:?}"),
        }),
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind.name())
            .field("default_value", &self.default_value)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}
