// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validators and validity results.
//!
//! A [`Validator`] is a named check over a subject. [`Validators`] runs an
//! ordered list of them and aggregates the failures into a [`Validity`], whose
//! [`Reason`]s carry the dotted path of the value that failed.
//!
//! Types that can be validated as a whole (nested models, for instance)
//! implement [`Validatable`]; property values exposing that capability are
//! validated recursively under the path of the property holding them.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DefinitionError, ValidationError};
use crate::value::Value;

/// The named validators every definition can refer to by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StandardValidator {
    /// The value is set.
    IsRequired,
    /// The value is truthy.
    IsFilled,
    /// The value is greater than zero.
    IsPositive,
    /// The value is lower than zero.
    IsNegative,
}

impl StandardValidator {
    /// Every standard validator, in registry order.
    pub const ALL: [Self; 4] = [
        Self::IsRequired,
        Self::IsFilled,
        Self::IsPositive,
        Self::IsNegative,
    ];

    /// Returns the registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IsRequired => "isRequired",
            Self::IsFilled => "isFilled",
            Self::IsPositive => "isPositive",
            Self::IsNegative => "isNegative",
        }
    }

    /// Looks up a standard validator by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }

    /// Runs the predicate.
    #[must_use]
    pub fn check(self, value: &Value) -> bool {
        match self {
            Self::IsRequired => !value.is_null(),
            Self::IsFilled => value.is_truthy(),
            Self::IsPositive => value.to_number() > 0.0,
            Self::IsNegative => value.to_number() < 0.0,
        }
    }
}

/// What a single validator reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A plain predicate result.
    Bool(bool),
    /// A structured result whose reasons are kept verbatim.
    Validity(Validity),
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        Self::Bool(passed)
    }
}

impl From<Validity> for Outcome {
    fn from(validity: Validity) -> Self {
        Self::Validity(validity)
    }
}

type CheckFn<T> = dyn Fn(&T, &str) -> Outcome + Send + Sync;

/// A named check over a subject of type `T`.
///
/// Validators with an empty name are anonymous; their failures are reported
/// with an empty `failedValidator`.
///
/// # Example
///
/// ```rust
/// use tessel_property::{Validator, Validators, Value};
///
/// let mut validators = Validators::new();
/// validators.add(Validator::named("isFilled").unwrap());
/// validators.add(Validator::predicate("isShort", |v: &Value| {
///     v.as_str().is_some_and(|s| s.len() < 4)
/// }));
///
/// let validity = validators.check_validity(&Value::from("Dupont"), "name");
/// assert!(!validity.is_valid());
/// assert_eq!(validity.reasons()[0].failed_validator(), "isShort");
/// assert_eq!(validity.reasons()[0].path(), "name");
/// ```
pub struct Validator<T: ?Sized> {
    name: Arc<str>,
    check: Arc<CheckFn<T>>,
}

impl<T: ?Sized + 'static> Validator<T> {
    /// Creates a validator from a boolean predicate.
    pub fn predicate(
        name: impl Into<Arc<str>>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(move |subject: &T, _path: &str| Outcome::Bool(predicate(subject))),
        }
    }

    /// Creates a validator that returns a structured result.
    ///
    /// The closure receives the path of the subject so that it can attribute
    /// its own reasons.
    pub fn structured(
        name: impl Into<Arc<str>>,
        check: impl Fn(&T, &str) -> Validity + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(move |subject: &T, path: &str| Outcome::Validity(check(subject, path))),
        }
    }
}

impl<T: ?Sized> Validator<T> {
    /// Returns the validator name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the check against `subject` located at `path`.
    #[must_use]
    pub fn run(&self, subject: &T, path: &str) -> Outcome {
        (self.check)(subject, path)
    }
}

impl Validator<Value> {
    /// Returns the validator for a standard predicate.
    #[must_use]
    pub fn standard(standard: StandardValidator) -> Self {
        Self::predicate(standard.name(), move |value: &Value| standard.check(value))
    }

    /// Looks up a standard validator by name.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownValidator`] if no standard validator
    /// has that name.
    pub fn named(name: &str) -> Result<Self, DefinitionError> {
        StandardValidator::from_name(name)
            .map(Self::standard)
            .ok_or_else(|| DefinitionError::UnknownValidator(name.to_owned()))
    }

    /// Resolves a validator declared in a JSON document.
    ///
    /// # Errors
    ///
    /// Strings must name a standard validator; anything else is rejected with
    /// [`DefinitionError::InvalidValidator`].
    pub fn from_json(json: &serde_json::Value) -> Result<Self, DefinitionError> {
        match json {
            serde_json::Value::String(name) => Self::named(name),
            other => Err(DefinitionError::InvalidValidator(json_kind(other).to_owned())),
        }
    }
}

impl From<StandardValidator> for Validator<Value> {
    fn from(standard: StandardValidator) -> Self {
        Self::standard(standard)
    }
}

impl TryFrom<&str> for Validator<Value> {
    type Error = DefinitionError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::named(name)
    }
}

impl<T: ?Sized> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// An ordered list of validators.
pub struct Validators<T: ?Sized> {
    list: Vec<Validator<T>>,
}

impl<T: ?Sized> Validators<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Appends a validator.
    pub fn add(&mut self, validator: Validator<T>) {
        self.list.push(validator);
    }

    /// Returns the number of validators.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if there are no validators.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterates in run order.
    pub fn iter(&self) -> impl Iterator<Item = &Validator<T>> {
        self.list.iter()
    }

    /// Runs every validator against `subject` and aggregates the failures.
    ///
    /// A failed predicate contributes one reason named after the validator;
    /// a structured result contributes its reasons verbatim.
    #[must_use]
    pub fn check_subject(&self, subject: &T, path: &str) -> Validity {
        let mut validity = Validity::valid();
        for validator in &self.list {
            match validator.run(subject, path) {
                Outcome::Bool(true) => {}
                Outcome::Bool(false) => validity.push(Reason::new(validator.name(), path)),
                Outcome::Validity(result) => validity.merge(result),
            }
        }
        validity
    }
}

impl Validators<Value> {
    /// Validates a property value.
    ///
    /// After the list runs, a value exposing [`Validatable`] is validated
    /// recursively at the same path and its reasons are appended.
    #[must_use]
    pub fn check_validity(&self, value: &Value, path: &str) -> Validity {
        let mut validity = self.check_subject(value, path);
        if let Value::Custom(custom) = value
            && let Some(nested) = custom.as_validatable()
        {
            validity.merge(nested.check_validity_at(path));
        }
        validity
    }

    /// Resolves the `validators` option of a JSON declaration.
    ///
    /// Accepts a single validator or a list of them.
    ///
    /// # Errors
    ///
    /// Fails on the first entry [`Validator::from_json`] rejects.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, DefinitionError> {
        let list = match json {
            serde_json::Value::Array(items) => items
                .iter()
                .map(Validator::from_json)
                .collect::<Result<Vec<_>, _>>()?,
            single => vec![Validator::from_json(single)?],
        };
        Ok(Self { list })
    }
}

impl<T: ?Sized> Default for Validators<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Validators<T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Validators<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.list.iter().map(Validator::name))
            .finish()
    }
}

impl<T: ?Sized> Extend<Validator<T>> for Validators<T> {
    fn extend<I: IntoIterator<Item = Validator<T>>>(&mut self, iter: I) {
        self.list.extend(iter);
    }
}

impl<T: ?Sized> FromIterator<Validator<T>> for Validators<T> {
    fn from_iter<I: IntoIterator<Item = Validator<T>>>(iter: I) -> Self {
        Self {
            list: iter.into_iter().collect(),
        }
    }
}

/// A single validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    failed_validator: String,
    path: String,
}

impl Reason {
    /// Creates a reason for `failed_validator` at `path`.
    pub fn new(failed_validator: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            failed_validator: failed_validator.into(),
            path: path.into(),
        }
    }

    /// Name of the validator that failed.
    #[must_use]
    #[inline]
    pub fn failed_validator(&self) -> &str {
        &self.failed_validator
    }

    /// Dotted path of the value that failed. Empty at the root.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ failedValidator: '{}', path: '{}' }}",
            self.failed_validator, self.path
        )
    }
}

/// The aggregated result of a validation run.
///
/// `is_valid` holds exactly when there are no reasons. Reasons are kept in
/// run order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    is_valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reasons: Vec<Reason>,
}

impl Validity {
    /// A result with no reasons.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reasons: Vec::new(),
        }
    }

    /// Builds a result from collected reasons.
    #[must_use]
    pub fn from_reasons(reasons: Vec<Reason>) -> Self {
        Self {
            is_valid: reasons.is_empty(),
            reasons,
        }
    }

    /// Returns `true` if nothing failed.
    #[must_use]
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns the failures in run order.
    #[must_use]
    #[inline]
    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    /// Consumes the result and returns its reasons.
    #[must_use]
    pub fn into_reasons(self) -> Vec<Reason> {
        self.reasons
    }

    /// Records a failure.
    pub fn push(&mut self, reason: Reason) {
        self.reasons.push(reason);
        self.is_valid = false;
    }

    /// Appends the reasons of another result.
    pub fn merge(&mut self, other: Self) {
        self.reasons.extend(other.reasons);
        self.is_valid = self.reasons.is_empty();
    }

    /// Turns an invalid result into an error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Failed`] carrying every reason if the result
    /// is invalid.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ValidationError::Failed {
                reasons: self.reasons,
            })
        }
    }
}

impl Default for Validity {
    fn default() -> Self {
        Self::valid()
    }
}

impl FromIterator<Reason> for Validity {
    fn from_iter<I: IntoIterator<Item = Reason>>(iter: I) -> Self {
        Self::from_reasons(iter.into_iter().collect())
    }
}

/// Values that can be validated as a whole.
pub trait Validatable {
    /// Validates `self`, attributing failures relative to `path`.
    fn check_validity_at(&self, path: &str) -> Validity;

    /// Validates `self` from the root.
    fn check_validity(&self) -> Validity {
        self.check_validity_at("")
    }

    /// Validates `self` and fails if anything is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Failed`] with every collected reason.
    fn validate(&self) -> Result<(), ValidationError> {
        let validity = self.check_validity();
        if !validity.is_valid() {
            debug!(reasons = validity.reasons().len(), "validation failed");
        }
        validity.into_result()
    }
}
