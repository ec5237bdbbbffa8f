// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic property values.
//!
//! This module provides [`Value`], the JSON-shaped data model that property
//! stores hold, and [`CustomValue`], the extension point for instances of
//! constructible types (timestamps, nested models, ...).

use core::any::Any;
use core::fmt;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::validation::Validatable;

/// Insertion-ordered map used by [`Value::Object`].
pub type Map = IndexMap<String, Value>;

/// Largest integer magnitude that survives a round trip through `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A plain, JSON-shaped value.
///
/// Objects keep their keys in insertion order. `Null` stands for both "null"
/// and "absent" inside containers; property stores never hold it.
///
/// # Example
///
/// ```rust
/// use tessel_property::Value;
///
/// let value = Value::from(serde_json::json!({ "name": "Dupont", "age": 30 }));
/// assert_eq!(value.get("name").and_then(Value::as_str), Some("Dupont"));
/// assert_eq!(value.to_json(), serde_json::json!({ "name": "Dupont", "age": 30 }));
/// ```
#[derive(Debug, Default)]
pub enum Value {
    /// Null or absent.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered sequence.
    Array(Vec<Self>),
    /// An insertion-ordered keyed structure.
    Object(Map),
    /// An instance of a custom type.
    Custom(Box<dyn CustomValue>),
}

/// Instances of custom property types.
///
/// Implementors are the Rust counterpart of class instances: they can be
/// recognized by type, may know how to serialize themselves, and may expose
/// nested validation.
pub trait CustomValue: Any + fmt::Debug + Send + Sync + 'static {
    /// Returns the name of the type this value is an instance of.
    fn type_name(&self) -> &str;

    /// Self-serialize capability.
    ///
    /// Returns `None` when the type has no plain representation, in which
    /// case serializers pass the instance through unchanged.
    fn serialize(&self) -> Option<Value> {
        None
    }

    /// Primitive used when the value is coerced to a number.
    fn to_primitive(&self) -> Option<Value> {
        self.serialize()
    }

    /// Clones the value behind a fresh box.
    fn clone_boxed(&self) -> Box<dyn CustomValue>;

    /// Compares with another custom value.
    fn eq_custom(&self, other: &dyn CustomValue) -> bool;

    /// Upcasts to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for mutable downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Nested validation capability.
    fn as_validatable(&self) -> Option<&dyn Validatable> {
        None
    }
}

impl dyn CustomValue {
    /// Returns `true` if the value is a `T`.
    #[must_use]
    pub fn is<T: CustomValue>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Attempts to downcast to `&T`.
    #[must_use]
    pub fn downcast_ref<T: CustomValue>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Attempts to downcast to `&mut T`.
    #[must_use]
    pub fn downcast_mut<T: CustomValue>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the name of this value's shape.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Custom(_) => "custom",
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the custom instance, if this is one.
    #[must_use]
    pub fn as_custom(&self) -> Option<&dyn CustomValue> {
        match self {
            Self::Custom(custom) => Some(custom.as_ref()),
            _ => None,
        }
    }

    /// Returns the custom instance mutably, if this is one.
    #[must_use]
    pub fn as_custom_mut(&mut self) -> Option<&mut dyn CustomValue> {
        match self {
            Self::Custom(custom) => Some(custom.as_mut()),
            _ => None,
        }
    }

    /// Downcasts a custom instance to `&T`.
    #[must_use]
    pub fn downcast_ref<T: CustomValue>(&self) -> Option<&T> {
        self.as_custom().and_then(<dyn CustomValue>::downcast_ref::<T>)
    }

    /// Looks up `key` when this is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) | Self::Custom(_) => true,
        }
    }

    /// Numeric coercion.
    ///
    /// Strings are trimmed and parsed (empty means `0`); arrays go through
    /// their string form; objects and unparsable input yield `NaN`.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::Array(_) => parse_number(&self.to_display_string()),
            Self::Object(_) => f64::NAN,
            Self::Custom(custom) => custom.to_primitive().map_or(f64::NAN, |v| v.to_number()),
        }
    }

    /// String coercion.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Self::Null => String::new(),
                        other => other.to_display_string(),
                    })
                    .collect();
                parts.join(",")
            }
            Self::Object(_) => "[object Object]".to_owned(),
            Self::Custom(custom) => custom
                .serialize()
                .map_or_else(|| "[object Object]".to_owned(), |v| v.to_display_string()),
        }
    }

    /// Converts to a `serde_json` value.
    ///
    /// Integral numbers become JSON integers, non-finite numbers become
    /// `null`, and custom values are emitted through their self-serialize
    /// capability (or `null` without one).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Custom(custom) => custom
                .serialize()
                .map_or(serde_json::Value::Null, |v| v.to_json()),
        }
    }
}

/// Parses a number the way loose string-to-number coercion does.
fn parse_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        // `from_str_radix` would accept a sign after the prefix.
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return f64::NAN;
        }
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    // Rust accepts spellings such as "inf" and "NaN" that must not parse here.
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')))
    {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        #[expect(clippy::cast_possible_truncation, reason = "integral and within i64 range")]
        let integer = n as i64;
        return serde_json::Value::from(integer);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Bool(b) => Self::Bool(*b),
            Self::Number(n) => Self::Number(*n),
            Self::String(s) => Self::String(s.clone()),
            Self::Array(items) => Self::Array(items.clone()),
            Self::Object(map) => Self::Object(map.clone()),
            Self::Custom(custom) => Self::Custom(custom.clone_boxed()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a.eq_custom(b.as_ref()),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Self::from(json.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(_) | Self::Custom(_) => self.to_json().serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}
