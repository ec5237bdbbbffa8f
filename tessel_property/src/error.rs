// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

use crate::validation::Reason;

/// Errors raised while declaring a property or a validator.
///
/// These are programmer errors: a definition that fails never becomes part of
/// a model type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A required argument was empty or absent.
    #[error("{0} is missing")]
    MissingArgument(&'static str),

    /// An option key that is not an attribute of a property definition.
    #[error("option '{0}' is unknown")]
    UnknownOption(String),

    /// A recognized option key with a value it cannot take.
    #[error("option '{option}' is invalid: {reason}")]
    InvalidOption {
        /// The option key.
        option: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A type tag that names no known property kind.
    #[error("invalid type '{0}'")]
    InvalidType(String),

    /// A validator name that is not in the standard registry.
    #[error("validator '{0}' is unknown")]
    UnknownValidator(String),

    /// A validator given as something other than a name or a function.
    #[error("validator should be a string or a function (got {0})")]
    InvalidValidator(String),

    /// The property set cannot hold more definitions.
    #[error("too many properties (max {max})")]
    TooManyProperties {
        /// The capacity that was reached.
        max: usize,
    },
}

/// Errors raised while converting a raw value into its stored form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The raw value has a shape the property kind cannot accept.
    #[error("type mismatch (expected {expected}, found {found})")]
    TypeMismatch {
        /// What the property accepts.
        expected: &'static str,
        /// What was given.
        found: &'static str,
    },

    /// Constructing an instance of a custom type failed.
    #[error("cannot construct {type_name}: {reason}")]
    Construct {
        /// The custom type being constructed.
        type_name: String,
        /// What went wrong.
        reason: String,
    },
}

/// The aggregate error produced by an explicit `validate()` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more validators failed.
    #[error("validation failed (reasons={})", format_reasons(.reasons))]
    Failed {
        /// Every collected failure, in run order.
        reasons: Vec<Reason>,
    },
}

impl ValidationError {
    /// Returns the collected reasons.
    #[must_use]
    pub fn reasons(&self) -> &[Reason] {
        match self {
            Self::Failed { reasons } => reasons,
        }
    }
}

fn format_reasons(reasons: &[Reason]) -> String {
    let reasons: Vec<_> = reasons.iter().map(Reason::to_string).collect();
    format!("[{}]", reasons.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_reason() {
        let err = ValidationError::Failed {
            reasons: vec![Reason::new("isFilled", "name"), Reason::new("isPositive", "age")],
        };
        assert_eq!(
            err.to_string(),
            "validation failed (reasons=[{ failedValidator: 'isFilled', path: 'name' }, \
             { failedValidator: 'isPositive', path: 'age' }])"
        );
        assert_eq!(err.reasons().len(), 2);

        let empty = ValidationError::Failed { reasons: Vec::new() };
        assert_eq!(empty.to_string(), "validation failed (reasons=[])");
    }

    #[test]
    fn definition_error_messages() {
        assert_eq!(DefinitionError::MissingArgument("name").to_string(), "name is missing");
        assert_eq!(
            DefinitionError::UnknownOption("colour".into()).to_string(),
            "option 'colour' is unknown"
        );
        assert_eq!(
            ConversionError::TypeMismatch { expected: "array", found: "string" }.to_string(),
            "type mismatch (expected array, found string)"
        );
    }
}
