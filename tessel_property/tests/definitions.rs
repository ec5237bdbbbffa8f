// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `tessel_property` crate.
//!
//! These exercise definitions, stores, and validators together, the way a
//! model type drives them.

use serde_json::json;
use tessel_property::{
    DefinitionError, OPTION_KEYS, PropertyDefinition, PropertyKind, PropertyOptions, PropertySet,
    PropertyStore, Reason, StandardValidator, Validator, Validators, Validity, Value,
};

fn person_set() -> PropertySet {
    let mut set = PropertySet::new();
    let declarations = [
        ("name", PropertyKind::String, Some(StandardValidator::IsFilled)),
        ("age", PropertyKind::Number, Some(StandardValidator::IsPositive)),
        ("isAlive", PropertyKind::Boolean, None),
        ("tags", PropertyKind::Array, None),
        ("address", PropertyKind::Object, None),
    ];
    for (name, kind, validator) in declarations {
        let mut options = PropertyOptions::new();
        if let Some(validator) = validator {
            options = options.validator(validator.into());
        }
        set.register(PropertyDefinition::create(name, Some(kind), options).unwrap())
            .unwrap();
    }
    set
}

fn assign(set: &PropertySet, store: &mut PropertyStore, source: serde_json::Value) {
    let Value::Object(map) = Value::from(source) else {
        panic!("source should be an object");
    };
    for (key, raw) in map {
        let id = set.by_name(&key).unwrap();
        store.set(id, set.get(id).unwrap(), raw).unwrap();
    }
}

fn serialize(set: &PropertySet, store: &PropertyStore) -> serde_json::Value {
    let mut out = tessel_property::Map::new();
    for (id, value) in store.iter() {
        let definition = set.get(id).unwrap();
        out.insert(definition.name().to_owned(), definition.serialize(value));
    }
    Value::Object(out).to_json()
}

fn check(set: &PropertySet, store: &PropertyStore) -> Validity {
    let mut validity = Validity::valid();
    for (id, definition) in set.iter() {
        validity.merge(definition.check_validity(store.get(id), definition.name()));
    }
    validity
}

#[test]
fn every_kind_converts_and_serializes() {
    let set = person_set();
    let mut store = PropertyStore::new();
    assign(
        &set,
        &mut store,
        json!({
            "name": 42,
            "age": "30",
            "isAlive": 1,
            "tags": ["a", null],
            "address": { "city": "Paris", "zip": null }
        }),
    );

    assert_eq!(
        serialize(&set, &store),
        json!({
            "name": "42",
            "age": 30,
            "isAlive": true,
            "tags": ["a", null],
            "address": { "city": "Paris" }
        })
    );
}

#[test]
fn store_keeps_declaration_order_regardless_of_assignment_order() {
    let set = person_set();
    let mut store = PropertyStore::new();
    assign(&set, &mut store, json!({ "isAlive": true, "name": "Dupont" }));

    let keys: Vec<_> = serialize(&set, &store)
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, ["name", "isAlive"]);
}

#[test]
fn validation_collects_reasons_in_declaration_order() {
    let set = person_set();
    let store = PropertyStore::new();

    let validity = check(&set, &store);
    assert!(!validity.is_valid());
    assert_eq!(
        validity.reasons(),
        [Reason::new("isFilled", "name"), Reason::new("isPositive", "age")]
    );
}

#[test]
fn valid_values_produce_no_reasons() {
    let set = person_set();
    let mut store = PropertyStore::new();
    assign(&set, &mut store, json!({ "name": "Dupont", "age": 30 }));

    let validity = check(&set, &store);
    assert!(validity.is_valid());
    assert!(validity.reasons().is_empty());
}

#[test]
fn every_option_key_is_accepted() {
    for key in OPTION_KEYS {
        let value = match key {
            "type" => json!("string"),
            "validators" => json!(["isRequired"]),
            "defaultValue" => json!("x"),
            _ => continue,
        };
        let options = PropertyOptions::new().raw(key, value);
        assert!(PropertyDefinition::create("p", Some(PropertyKind::String), options).is_ok());
    }
}

#[test]
fn misspelled_options_are_rejected() {
    let options = PropertyOptions::from_json(
        json!({ "type": "string", "validator": "isFilled" }).as_object().unwrap(),
    );
    assert_eq!(
        PropertyDefinition::create("name", None, options).unwrap_err(),
        DefinitionError::UnknownOption("validator".into())
    );
}

#[test]
fn custom_predicates_are_reported_by_name() {
    let has_valid_status = Validator::predicate("hasValidStatus", |value: &Value| {
        matches!(value.as_str(), Some("active" | "retired"))
    });
    let validators: Validators<Value> = [has_valid_status].into_iter().collect();

    assert!(validators.check_validity(&Value::from("active"), "status").is_valid());
    assert_eq!(
        validators.check_validity(&Value::from("unknown"), "status").reasons(),
        [Reason::new("hasValidStatus", "status")]
    );
}
