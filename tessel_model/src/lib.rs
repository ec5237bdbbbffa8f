// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessel Model: model types with declared properties.
//!
//! A [`ModelType`] declares typed properties, model-level validators, and
//! type-level listeners. Its instances, [`Model`]s, hold converted values in
//! declaration order, report every real change as a [`ModelEvent`], validate
//! recursively with dotted paths, and serialize to a sparse plain form.
//!
//! Property definitions, kinds, values, and validators come from
//! `tessel_property` and are re-exported here.
//!
//! ## Lifecycle
//!
//! - [`ModelType::create`] assigns the source in update mode, applies default
//!   values, then emits [`ModelEvent::Created`].
//! - [`ModelType::unserialize`] assigns the source in update mode and emits
//!   [`ModelEvent::Unserialized`]. Defaults are never applied.
//! - [`Model::set`] converts and stores one value; [`Model::set_value`]
//!   assigns every declared property in [`AssignMode::Replace`] or
//!   [`AssignMode::Update`].
//! - [`Model::serialize`] writes the set properties through their serializers.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use serde_json::json;
//! use tessel_model::{
//!     EventKind, ModelType, PropertyKind, PropertyOptions, Reason, StandardValidator, Validator,
//!     Value,
//! };
//!
//! let changes = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&changes);
//!
//! let person = ModelType::define("Person", |t| {
//!     t.add_property_with(
//!         "name",
//!         PropertyKind::String,
//!         PropertyOptions::new().validator(StandardValidator::IsFilled.into()),
//!     )?;
//!     t.add_property_with(
//!         "status",
//!         PropertyKind::String,
//!         PropertyOptions::new().validator(Validator::predicate("hasValidStatus", |v: &Value| {
//!             matches!(v.as_str(), Some("active" | "retired"))
//!         })),
//!     )?;
//!     t.on_event(move |_, event| {
//!         if event.kind() == EventKind::ModelChanged {
//!             counter.fetch_add(1, Ordering::Relaxed);
//!         }
//!     });
//!     Ok(())
//! })
//! .unwrap();
//!
//! let mut model = person.create(json!({ "name": "Dupont", "status": "unknown" })).unwrap();
//! assert_eq!(
//!     model.check_validity().reasons(),
//!     [Reason::new("hasValidStatus", "status")]
//! );
//!
//! model.set("status", "active").unwrap();
//! assert!(model.validate().is_ok());
//! assert_eq!(changes.load(Ordering::Relaxed), 2);
//! ```
//!
//! ## Features
//!
//! - `chrono` (default): forwards to `tessel_property/chrono` for
//!   [`PropertyKind::timestamp`].

mod error;
mod event;
mod model;
mod model_type;
mod schema;

pub use error::ModelError;
pub use event::{EventKind, ModelEvent, SubscriptionId, TypeListener};
pub use model::{AssignMode, Model};
pub use model_type::{MODEL_VALIDATOR, ModelType, ModelTypeBuilder};

#[cfg(feature = "chrono")]
pub use tessel_property::Timestamp;
pub use tessel_property::{
    ConversionError, DefinitionError, PropertyDefinition, PropertyKind, PropertyOptions, Reason,
    StandardValidator, Validatable, ValidationError, Validator, Validators, Validity, Value,
};
