// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `tessel_model` crate.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tessel_model::{
    DefinitionError, EventKind, Model, ModelError, ModelEvent, ModelType, PropertyKind,
    PropertyOptions, Reason, StandardValidator, Validatable, ValidationError, Validator, Value,
};

type EventLog = Arc<Mutex<Vec<String>>>;

fn describe(event: &ModelEvent<'_>) -> String {
    match event.property() {
        Some(property) => format!("{}:{property}", event.kind()),
        None => event.kind().to_string(),
    }
}

fn person_with_log() -> (Arc<ModelType>, EventLog) {
    let log = EventLog::default();
    let sink = Arc::clone(&log);
    let person = ModelType::define("Person", move |t| {
        t.add_property("firstName", PropertyKind::String)?;
        t.add_property("lastName", PropertyKind::String)?;
        t.add_property_with(
            "isAlive",
            PropertyKind::Boolean,
            PropertyOptions::new().default_value(true),
        )?;
        t.on_event(move |_, event| sink.lock().unwrap().push(describe(event)));
        Ok(())
    })
    .unwrap();
    (person, log)
}

fn validated_person() -> Arc<ModelType> {
    ModelType::define("Person", |t| {
        t.add_property_with(
            "name",
            PropertyKind::String,
            PropertyOptions::new().validator(StandardValidator::IsFilled.into()),
        )?;
        t.add_property_with(
            "age",
            PropertyKind::Number,
            PropertyOptions::new().validator(StandardValidator::IsPositive.into()),
        )?;
        t.add_property_with(
            "status",
            PropertyKind::String,
            PropertyOptions::new().validator(Validator::predicate("hasValidStatus", |v: &Value| {
                matches!(v.as_str(), Some("active" | "retired"))
            })),
        )?;
        Ok(())
    })
    .unwrap()
}

#[test]
fn replace_clears_and_update_preserves() {
    let (person, _) = person_with_log();
    let source = json!({ "firstName": "Jean", "lastName": "Dupont" });

    let mut replaced = person.create(source.clone()).unwrap();
    replaced.replace_value(json!({ "lastName": "Durand" })).unwrap();
    assert_eq!(replaced.to_json(), json!({ "lastName": "Durand" }));

    let mut updated = person.create(source).unwrap();
    updated.update_value(json!({ "lastName": "Durand" })).unwrap();
    assert_eq!(
        updated.to_json(),
        json!({ "firstName": "Jean", "lastName": "Durand", "isAlive": true })
    );
}

#[test]
fn clear_value_reports_each_cleared_property() {
    let (person, log) = person_with_log();
    let mut model = person
        .create(json!({ "firstName": "Jean", "lastName": "Dupont" }))
        .unwrap();
    log.lock().unwrap().clear();

    assert!(model.clear_value());
    assert_eq!(model.to_json(), json!({}));
    assert_eq!(
        *log.lock().unwrap(),
        [
            "propertyChanged:firstName",
            "propertyChanged:lastName",
            "propertyChanged:isAlive",
            "modelChanged",
        ]
    );

    log.lock().unwrap().clear();
    assert!(!model.clear_value());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn identical_containers_are_not_changes() {
    let log = EventLog::default();
    let sink = Arc::clone(&log);
    let contact = ModelType::define("Contact", move |t| {
        t.add_property("name", PropertyKind::String)?;
        t.add_property("tags", PropertyKind::Array)?;
        t.add_property("address", PropertyKind::Object)?;
        t.on_event(move |_, event| sink.lock().unwrap().push(describe(event)));
        Ok(())
    })
    .unwrap();
    let source = json!({
        "name": "Dupont",
        "tags": ["admin", { "level": 2 }],
        "address": { "city": "Paris", "lines": ["1 rue de Rivoli"] },
    });
    let mut model = contact.create(source.clone()).unwrap();
    log.lock().unwrap().clear();

    assert!(!model.replace_value(source.clone()).unwrap());
    assert!(!model.update_value(source.clone()).unwrap());
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(model.to_json(), source);
}

#[test]
fn defaults_apply_on_create_only() {
    let (person, log) = person_with_log();

    let created = person.create(json!({ "lastName": "Dupont" })).unwrap();
    assert_eq!(created.to_json(), json!({ "lastName": "Dupont", "isAlive": true }));
    assert_eq!(
        *log.lock().unwrap(),
        [
            "propertyChanged:lastName",
            "modelChanged",
            "propertyChanged:isAlive",
            "created",
        ]
    );

    log.lock().unwrap().clear();
    let restored = person.unserialize(json!({ "lastName": "Dupont" })).unwrap();
    assert_eq!(restored.to_json(), json!({ "lastName": "Dupont" }));
    assert_eq!(
        *log.lock().unwrap(),
        ["propertyChanged:lastName", "modelChanged", "unserialized"]
    );
}

#[test]
fn explicit_false_is_not_overridden_by_defaults() {
    let (person, _) = person_with_log();
    let model = person.create(json!({ "isAlive": false })).unwrap();
    assert_eq!(model.get("isAlive"), Some(&Value::from(false)));
}

#[test]
fn serialization_round_trips() {
    let (person, _) = person_with_log();
    let model = person
        .create(json!({ "firstName": "Jean", "lastName": null, "isAlive": 0 }))
        .unwrap();
    let json = model.to_json();
    assert_eq!(json, json!({ "firstName": "Jean", "isAlive": false }));

    let restored = person.unserialize(json.clone()).unwrap();
    assert_eq!(restored, model);
    assert_eq!(restored.to_json(), json);
}

#[test]
fn type_listeners_run_before_instance_listeners() {
    let (person, log) = person_with_log();
    let mut model = person.create_empty().unwrap();
    log.lock().unwrap().clear();

    let sink = Arc::clone(&log);
    model.subscribe(move |_, event| sink.lock().unwrap().push(format!("instance {}", describe(event))));

    model
        .update_value(json!({ "firstName": "Jean", "lastName": "Dupont" }))
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        [
            "propertyChanged:firstName",
            "instance propertyChanged:firstName",
            "propertyChanged:lastName",
            "instance propertyChanged:lastName",
            "modelChanged",
            "instance modelChanged",
        ]
    );
}

#[test]
fn validation_reports_every_failure() {
    let person = validated_person();

    let empty = person.create_empty().unwrap();
    let validity = empty.check_validity();
    assert!(!validity.is_valid());
    assert_eq!(
        validity.reasons(),
        [
            Reason::new("isFilled", "name"),
            Reason::new("isPositive", "age"),
            Reason::new("hasValidStatus", "status"),
        ]
    );

    let filled = person
        .create(json!({ "name": "Dupont", "age": 30, "status": "unknown" }))
        .unwrap();
    assert_eq!(
        filled.check_validity().reasons(),
        [Reason::new("hasValidStatus", "status")]
    );
    assert_eq!(
        serde_json::to_value(filled.check_validity()).unwrap(),
        json!({ "isValid": false, "reasons": [{ "failedValidator": "hasValidStatus", "path": "status" }] })
    );

    let err = filled.validate().unwrap_err();
    assert_eq!(err.reasons(), [Reason::new("hasValidStatus", "status")]);
    assert_eq!(
        err.to_string(),
        "validation failed (reasons=[{ failedValidator: 'hasValidStatus', path: 'status' }])"
    );
}

#[test]
fn validation_errors_convert_to_model_errors() {
    let model = validated_person()
        .create(json!({ "name": "Dupont", "age": -1, "status": "active" }))
        .unwrap();
    let err: ModelError = model.validate().unwrap_err().into();
    assert_eq!(
        err,
        ModelError::Validation(ValidationError::Failed {
            reasons: vec![Reason::new("isPositive", "age")],
        })
    );
}

#[test]
fn unknown_options_fail_at_declaration() {
    let err = ModelType::define("Person", |t| {
        t.add_property_with(
            "name",
            PropertyKind::String,
            PropertyOptions::new().raw("defaultVal", json!("x")),
        )?;
        Ok(())
    })
    .unwrap_err();
    assert_eq!(err, ModelError::from(DefinitionError::UnknownOption("defaultVal".into())));
}

#[test]
fn nested_models_validate_under_the_parent_path() {
    let company = ModelType::define("Company", |t| {
        t.add_property_with(
            "name",
            PropertyKind::String,
            PropertyOptions::new().validator(StandardValidator::IsFilled.into()),
        )?;
        Ok(())
    })
    .unwrap();
    let employee = ModelType::define("Employee", |t| {
        t.add_property_with(
            "company",
            company.kind(),
            PropertyOptions::new().validator(StandardValidator::IsRequired.into()),
        )?;
        Ok(())
    })
    .unwrap();

    let unemployed = employee.create_empty().unwrap();
    assert_eq!(
        unemployed.check_validity().reasons(),
        [Reason::new("isRequired", "company")]
    );

    let model = employee.create(json!({ "company": { "name": "" } })).unwrap();
    let nested = model.get("company").and_then(Value::downcast_ref::<Model>);
    assert!(nested.is_some_and(|c| c.is_instance_of(&company)));
    assert_eq!(
        model.check_validity().reasons(),
        [Reason::new("isFilled", "company.name")]
    );
    assert_eq!(model.check_validity_at("staff.0").reasons()[0].path(), "staff.0.company.name");

    assert_eq!(model.to_json(), json!({ "company": { "name": "" } }));
}

#[test]
fn nested_instances_are_stored_as_is() {
    let company = ModelType::define("Company", |t| {
        t.add_property("name", PropertyKind::String)?;
        Ok(())
    })
    .unwrap();
    let employee = ModelType::define("Employee", |t| {
        t.add_property("company", company.kind())?;
        Ok(())
    })
    .unwrap();

    let acme = company.create(json!({ "name": "Acme" })).unwrap();
    let mut model = employee.create_empty().unwrap();
    assert!(model.set("company", acme.clone()).unwrap());
    assert!(!model.set("company", acme).unwrap());
    assert_eq!(model.to_json(), json!({ "company": { "name": "Acme" } }));
}

#[test]
fn subtypes_inherit_declarations_and_listeners() {
    let (person, log) = person_with_log();
    let employee = person
        .extend("Employee", |t| {
            t.add_property("company", PropertyKind::String)?;
            t.add_validator(Validator::predicate("hasCompany", |m: &Model| m.has("company")));
            Ok(())
        })
        .unwrap();

    let model = employee.create(json!({ "lastName": "Dupont" })).unwrap();
    assert!(model.is_instance_of(&person));
    assert!(model.is_instance_of(&employee));
    assert!(!person.create_empty().unwrap().is_instance_of(&employee));

    assert_eq!(
        model.to_json(),
        json!({ "lastName": "Dupont", "isAlive": true })
    );
    assert_eq!(model.check_validity().reasons(), [Reason::new("hasCompany", "")]);
    assert!(log.lock().unwrap().iter().any(|e| e == "created"));
}

#[test]
fn custom_model_validators_are_named_in_reasons() {
    let range = ModelType::define("Range", |t| {
        t.add_property("min", PropertyKind::Number)?;
        t.add_property("max", PropertyKind::Number)?;
        t.add_validator(Validator::predicate("isOrdered", |m: &Model| {
            match (m.get("min"), m.get("max")) {
                (Some(min), Some(max)) => min.to_number() <= max.to_number(),
                _ => true,
            }
        }));
        Ok(())
    })
    .unwrap();

    assert!(range.create(json!({ "min": 1, "max": 2 })).unwrap().validate().is_ok());
    assert_eq!(
        range
            .create(json!({ "min": 3, "max": 2 }))
            .unwrap()
            .check_validity()
            .reasons(),
        [Reason::new("isOrdered", "")]
    );
}

#[test]
fn listener_events_observe_post_assignment_state() {
    let (person, _) = person_with_log();
    let mut model = person.create_empty().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    model.subscribe(move |model, event| {
        if event.kind() == EventKind::ModelChanged {
            sink.lock().unwrap().push(model.to_json());
        }
    });

    model
        .update_value(json!({ "firstName": "Jean", "lastName": "Dupont" }))
        .unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        [json!({ "firstName": "Jean", "lastName": "Dupont", "isAlive": true })]
    );
}

#[cfg(feature = "chrono")]
#[test]
fn timestamps_serialize_in_a_fixed_format() {
    use tessel_model::Timestamp;

    let event = ModelType::define("Event", |t| {
        t.add_property("at", PropertyKind::timestamp())?;
        Ok(())
    })
    .unwrap();

    let model = event.create(json!({ "at": "2015-03-01T12:00:00+02:00" })).unwrap();
    let stored = model.get("at").and_then(Value::downcast_ref::<Timestamp>);
    assert_eq!(stored.map(Timestamp::millis), Some(1_425_204_000_000));
    assert_eq!(model.to_json(), json!({ "at": "2015-03-01T10:00:00.000Z" }));

    let restored = event.unserialize(model.to_json()).unwrap();
    assert_eq!(restored, model);

    assert!(matches!(
        event.create(json!({ "at": true })),
        Err(ModelError::Conversion { .. })
    ));
}
