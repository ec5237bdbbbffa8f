// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Options accepted when declaring a property.
//!
//! Options are an ordered list of `(key, value)` pairs applied onto a
//! definition after the kind-derived defaults. Keys are checked when the
//! definition is created, so a misspelled option fails at declaration time.

use core::fmt;
use std::sync::Arc;

use crate::definition::{DefaultValue, PropertyHost};
use crate::error::ConversionError;
use crate::kind::{Converter, PropertyKind, Serializer};
use crate::validation::{Validator, Validators};
use crate::value::Value;

/// Option keys a definition recognizes.
pub const OPTION_KEYS: [&str; 5] = ["type", "converter", "serializer", "defaultValue", "validators"];

/// The value of a single option.
#[derive(Clone)]
pub enum OptionValue {
    /// A property kind.
    Kind(PropertyKind),
    /// A converter override.
    Converter(Converter),
    /// A serializer override.
    Serializer(Serializer),
    /// A default value.
    Default(DefaultValue),
    /// A validator list.
    Validators(Validators<Value>),
    /// An undecoded value from a declarative document.
    Json(serde_json::Value),
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            Self::Converter(_) => f.write_str("Converter(..)"),
            Self::Serializer(_) => f.write_str("Serializer(..)"),
            Self::Default(default) => f.debug_tuple("Default").field(default).finish(),
            Self::Validators(list) => f.debug_tuple("Validators").field(list).finish(),
            Self::Json(json) => f.debug_tuple("Json").field(json).finish(),
        }
    }
}

/// Builder for the options of a property declaration.
///
/// # Example
///
/// ```rust
/// use tessel_property::{PropertyDefinition, PropertyKind, PropertyOptions, StandardValidator};
///
/// let options = PropertyOptions::new()
///     .default_value(true)
///     .validator(StandardValidator::IsRequired.into());
/// let alive = PropertyDefinition::create("isAlive", Some(PropertyKind::Boolean), options).unwrap();
/// assert!(alive.has_default());
/// assert_eq!(alive.validators().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PropertyOptions {
    entries: Vec<(String, OptionValue)>,
}

impl PropertyOptions {
    /// Creates an empty option list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every entry of a declarative document.
    ///
    /// Values stay undecoded until the definition is created.
    #[must_use]
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        map.iter()
            .fold(Self::new(), |options, (key, value)| options.raw(key, value.clone()))
    }

    /// Sets the property kind.
    #[must_use]
    pub fn kind(self, kind: PropertyKind) -> Self {
        self.with("type", OptionValue::Kind(kind))
    }

    /// Overrides the converter.
    #[must_use]
    pub fn converter(
        self,
        converter: impl Fn(Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    ) -> Self {
        self.with("converter", OptionValue::Converter(Arc::new(converter)))
    }

    /// Overrides the serializer.
    #[must_use]
    pub fn serializer(self, serializer: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.with("serializer", OptionValue::Serializer(Arc::new(serializer)))
    }

    /// Sets a literal default value.
    #[must_use]
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.with("defaultValue", OptionValue::Default(DefaultValue::Literal(value.into())))
    }

    /// Sets a default computed from the instance being constructed.
    #[must_use]
    pub fn computed_default(
        self,
        compute: impl Fn(&dyn PropertyHost) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.with("defaultValue", OptionValue::Default(DefaultValue::Computed(Arc::new(compute))))
    }

    /// Appends a validator to the `validators` option.
    #[must_use]
    pub fn validator(mut self, validator: Validator<Value>) -> Self {
        let existing = self.entries.iter_mut().rev().find_map(|(key, value)| match value {
            OptionValue::Validators(list) if key.as_str() == "validators" => Some(list),
            _ => None,
        });
        match existing {
            Some(list) => list.add(validator),
            None => self.entries.push((
                "validators".to_owned(),
                OptionValue::Validators([validator].into_iter().collect()),
            )),
        }
        self
    }

    /// Replaces the `validators` option.
    #[must_use]
    pub fn validators(self, validators: Validators<Value>) -> Self {
        self.with("validators", OptionValue::Validators(validators))
    }

    /// Adds an undecoded option.
    ///
    /// The key is not checked here; unknown keys fail when the definition is
    /// created.
    #[must_use]
    pub fn raw(self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.with(key, OptionValue::Json(value))
    }

    /// Returns `true` if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in the order they were given.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, OptionValue)> {
        self.entries
    }

    fn with(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.entries.push((key.into(), value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::StandardValidator;
    use serde_json::json;

    #[test]
    fn validators_accumulate_into_one_entry() {
        let options = PropertyOptions::new()
            .validator(StandardValidator::IsRequired.into())
            .default_value(1)
            .validator(StandardValidator::IsPositive.into());
        let keys: Vec<_> = options.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["validators", "defaultValue"]);
        match options.iter().next() {
            Some((_, OptionValue::Validators(list))) => assert_eq!(list.len(), 2),
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn json_options_keep_document_order() {
        let doc = json!({ "type": "number", "defaultValue": 3, "validators": "isPositive" });
        let options = PropertyOptions::from_json(doc.as_object().unwrap());
        let keys: Vec<_> = options.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["type", "defaultValue", "validators"]);
    }
}
