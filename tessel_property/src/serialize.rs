// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive serialization of free-form values.

use crate::value::{Map, Value};

/// Serializes an arbitrary value into its plain form.
///
/// Returns `None` for `Null`, which callers treat as "omit". Custom values use
/// their self-serialize capability when they have one and pass through
/// otherwise.
#[must_use]
pub fn serialize(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(value.clone()),
        Value::Custom(custom) => Some(custom.serialize().unwrap_or_else(|| value.clone())),
        Value::Array(items) => Some(Value::Array(serialize_array(items))),
        Value::Object(map) => Some(Value::Object(serialize_object(map))),
    }
}

/// Serializes every entry of a keyed structure, dropping the ones that
/// serialize to nothing.
#[must_use]
pub fn serialize_object(map: &Map) -> Map {
    map.iter()
        .filter_map(|(key, value)| serialize(value).map(|out| (key.clone(), out)))
        .collect()
}

/// Serializes every element in place order. Elements that serialize to
/// nothing become `Null` so positions are kept.
#[must_use]
pub fn serialize_array(items: &[Value]) -> Vec<Value> {
    items.iter().map(|item| serialize(item).unwrap_or_default()).collect()
}
