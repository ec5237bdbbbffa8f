// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessel Property: typed property definitions for plain data models.
//!
//! This crate provides the pieces a model type is made of. Model types,
//! instances, and change notification are provided by `tessel_model`.
//!
//! ## Core Concepts
//!
//! ### Values
//!
//! [`Value`] is a JSON-shaped value with insertion-ordered objects plus a
//! [`Value::Custom`] variant for instances of constructible types such as
//! [`Timestamp`] or nested models.
//!
//! ### Definitions
//!
//! A [`PropertyDefinition`] is created from a name, a [`PropertyKind`], and
//! [`PropertyOptions`]. The kind selects a converter and a serializer:
//!
//! | kind | converter | serializer |
//! |------|-----------|------------|
//! | `Boolean` | truthiness | identity |
//! | `Number` | numeric parse | identity |
//! | `String` | stringify | identity |
//! | `Object` | identity | recursive, null entries dropped |
//! | `Array` | rejects non-arrays | recursive, in place order |
//! | `Class` / `Model` | construct non-instances | self-serialize, else identity |
//!
//! Options may override either table entry, set a default value, or attach
//! validators. Unknown option keys fail at declaration time.
//!
//! ### Storage
//!
//! [`PropertySet`] holds the definitions of a type in declaration order.
//! [`PropertyStore`] holds the converted values of one instance and reports
//! whether an assignment actually changed anything.
//!
//! ### Validation
//!
//! [`Validators`] runs named checks and collects [`Reason`]s with dotted
//! paths into a [`Validity`]. Values implementing [`Validatable`] are checked
//! recursively.
//!
//! ## Quick Start
//!
//! ```rust
//! use tessel_property::{
//!     PropertyDefinition, PropertyKind, PropertyOptions, PropertySet, PropertyStore,
//!     StandardValidator, Value,
//! };
//!
//! let mut set = PropertySet::new();
//! let age = set
//!     .register(
//!         PropertyDefinition::create(
//!             "age",
//!             Some(PropertyKind::Number),
//!             PropertyOptions::new().validator(StandardValidator::IsPositive.into()),
//!         )
//!         .unwrap(),
//!     )
//!     .unwrap();
//! let definition = set.get(age).unwrap();
//!
//! let mut store = PropertyStore::new();
//! store.set(age, definition, Value::from("-3")).unwrap();
//! assert_eq!(store.get(age), Some(&Value::from(-3)));
//!
//! let validity = definition.check_validity(store.get(age), "age");
//! assert!(!validity.is_valid());
//! assert_eq!(validity.reasons()[0].failed_validator(), "isPositive");
//! ```
//!
//! ## Features
//!
//! - `chrono` (default): the [`Timestamp`] type and [`PropertyKind::timestamp`].

mod definition;
mod error;
mod id;
mod kind;
mod options;
mod registry;
mod serialize;
mod store;
#[cfg(feature = "chrono")]
mod timestamp;
mod validation;
mod value;

pub use definition::{DefaultValue, PropertyDefinition, PropertyHost};
pub use error::{ConversionError, DefinitionError, ValidationError};
pub use id::PropertyId;
pub use kind::{Class, ClassType, Converter, PropertyKind, Serializer};
pub use options::{OPTION_KEYS, OptionValue, PropertyOptions};
pub use registry::PropertySet;
pub use serialize::{serialize, serialize_array, serialize_object};
pub use store::{Assignment, PropertyStore};
#[cfg(feature = "chrono")]
pub use timestamp::Timestamp;
pub use validation::{
    Outcome, Reason, StandardValidator, Validatable, Validator, Validators, Validity,
};
pub use value::{CustomValue, Map, Value};
