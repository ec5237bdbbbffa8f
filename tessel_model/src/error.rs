// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

use tessel_property::{ConversionError, DefinitionError, ValidationError};

/// Errors raised by model types and instances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A property or validator declaration was rejected.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A value could not be converted for a property.
    #[error("cannot assign '{property}': {source}")]
    Conversion {
        /// The property being assigned.
        property: String,
        /// The converter's error.
        source: ConversionError,
    },

    /// A property name the model type does not declare.
    #[error("property '{0}' is not declared")]
    UnknownProperty(String),

    /// A bulk assignment source that is neither an object nor null.
    #[error("cannot assign values from a {0}")]
    SourceNotObject(&'static str),

    /// A declarative schema document with an unexpected shape.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// An explicit validation gate failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
