// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Person model walkthrough.
//!
//! Declares a `Company` and a `Person` type, creates, edits, validates and
//! round-trips an instance while listeners report changes.
//!
//! Run:
//! - `cargo run -p tessel_demos --bin person`
//! - `RUST_LOG=tessel_model=trace cargo run -p tessel_demos --bin person` to
//!   see the library's own events.

use serde_json::json;
use tessel_model::{
    AssignMode, ModelError, ModelEvent, ModelType, PropertyKind, PropertyOptions, StandardValidator,
    Validator, Value,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ModelError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let company = ModelType::define("Company", |t| {
        t.add_property_with(
            "name",
            PropertyKind::String,
            PropertyOptions::new().validator(StandardValidator::IsFilled.into()),
        )?;
        Ok(())
    })?;

    let person = ModelType::define("Person", |t| {
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
            PropertyOptions::new()
                .default_value("active")
                .validator(Validator::predicate("hasValidStatus", |v: &Value| {
                    matches!(v.as_str(), Some("active" | "retired"))
                })),
        )?;
        t.add_property("tags", PropertyKind::Array)?;
        t.add_property("employer", company.kind())?;
        t.add_property("birthDate", PropertyKind::timestamp())?;
        t.on_event(|model, event| {
            if let ModelEvent::PropertyChanged { property, new_value, old_value } = event {
                info!(
                    model = model.model_type().name(),
                    property,
                    new = ?new_value.map(tessel_model::Value::to_json),
                    old = ?old_value.map(tessel_model::Value::to_json),
                    "property changed"
                );
            }
        });
        Ok(())
    })?;

    let mut dupont = person.create(json!({
        "name": "Dupont",
        "age": "42",
        "tags": ["admin"],
        "employer": { "name": "" },
        "birthDate": "1983-04-12",
    }))?;
    info!(json = %dupont.to_json(), "created");

    let validity = dupont.check_validity();
    if !validity.is_valid() {
        warn!(reasons = ?validity.reasons(), "invalid person");
    }

    dupont.update_value(json!({ "employer": { "name": "Acme" }, "status": "retired" }))?;
    dupont.set("age", -1)?;
    if let Err(err) = dupont.validate() {
        warn!(%err, "validation failed");
    }

    dupont.replace_value(json!({ "name": "Durand", "age": 30 }))?;
    let json = dupont.to_json();
    info!(%json, "replaced");

    let restored = person.unserialize(json)?;
    info!(equal = (restored == dupont), "restored");

    match dupont.set_value(json!("not an object"), AssignMode::Update) {
        Err(err) => info!(%err, "rejected"),
        Ok(_) => warn!("string source was accepted"),
    }

    Ok(())
}
