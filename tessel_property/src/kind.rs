// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property kinds and the converter/serializer tables derived from them.

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ConversionError, DefinitionError};
use crate::serialize::{serialize, serialize_array, serialize_object};
use crate::value::{CustomValue, Value};

/// Maps a raw input to its stored form.
pub type Converter = Arc<dyn Fn(Value) -> Result<Value, ConversionError> + Send + Sync>;

/// Maps a stored value to its plain, JSON-shaped form.
pub type Serializer = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A type whose instances live in [`Value::Custom`].
///
/// Implementors recognize their own instances and build new ones from plain
/// values.
pub trait ClassType: fmt::Debug + Send + Sync {
    /// Returns the type name.
    fn name(&self) -> &str;

    /// Returns `true` if `value` is already an instance of this type.
    fn is_instance(&self, value: &Value) -> bool;

    /// Builds an instance from a plain value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Construct`] when `raw` cannot describe an
    /// instance.
    fn construct(&self, raw: Value) -> Result<Value, ConversionError>;
}

type ConstructFn<T> = dyn Fn(Value) -> Result<T, ConversionError> + Send + Sync;

/// A [`ClassType`] backed by a Rust type and a constructor closure.
///
/// # Example
///
/// ```rust
/// use std::any::Any;
/// use tessel_property::{Class, ClassType, ConversionError, CustomValue, Value};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Tag(String);
///
/// impl CustomValue for Tag {
///     fn type_name(&self) -> &str { "Tag" }
///     fn serialize(&self) -> Option<Value> { Some(Value::from(self.0.as_str())) }
///     fn clone_boxed(&self) -> Box<dyn CustomValue> { Box::new(self.clone()) }
///     fn eq_custom(&self, other: &dyn CustomValue) -> bool {
///         other.downcast_ref::<Self>() == Some(self)
///     }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// let class = Class::new("Tag", |raw: Value| Ok(Tag(raw.to_display_string())));
/// let tag = class.construct(Value::from(7)).unwrap();
/// assert!(class.is_instance(&tag));
/// assert_eq!(tag.downcast_ref::<Tag>(), Some(&Tag("7".into())));
/// ```
pub struct Class<T> {
    name: String,
    construct: Box<ConstructFn<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: CustomValue> Class<T> {
    /// Creates a class named `name` built by `construct`.
    pub fn new(
        name: impl Into<String>,
        construct: impl Fn(Value) -> Result<T, ConversionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            construct: Box::new(construct),
            _marker: PhantomData,
        }
    }
}

impl<T: CustomValue> ClassType for Class<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_instance(&self, value: &Value) -> bool {
        value.as_custom().is_some_and(<dyn CustomValue>::is::<T>)
    }

    fn construct(&self, raw: Value) -> Result<Value, ConversionError> {
        (self.construct)(raw).map(|instance| Value::Custom(Box::new(instance)))
    }
}

impl<T> fmt::Debug for Class<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The closed set of property kinds.
///
/// A kind decides how raw inputs are converted and how stored values are
/// serialized. Definitions may override either table entry.
#[derive(Clone, Debug)]
pub enum PropertyKind {
    /// Booleans; other inputs are coerced by truthiness.
    Boolean,
    /// Numbers; other inputs are parsed.
    Number,
    /// Strings; other inputs are stringified.
    String,
    /// Free-form keyed structures.
    Object,
    /// Arrays; other inputs are rejected.
    Array,
    /// A constructible type: non-instances are passed to its constructor.
    Class(Arc<dyn ClassType>),
    /// A nested model type: non-instances are rebuilt through its
    /// reconstruct-from-plain-value capability.
    Model(Arc<dyn ClassType>),
}

impl PropertyKind {
    /// Wraps a constructible type.
    pub fn class(class: impl ClassType + 'static) -> Self {
        Self::Class(Arc::new(class))
    }

    /// The built-in timestamp kind.
    #[cfg(feature = "chrono")]
    #[must_use]
    pub fn timestamp() -> Self {
        Self::class(crate::timestamp::Timestamp::class())
    }

    /// Resolves a built-in kind from its tag.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidType`] for tags naming no built-in
    /// kind.
    pub fn from_name(name: &str) -> Result<Self, DefinitionError> {
        match name {
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            #[cfg(feature = "chrono")]
            "timestamp" => Ok(Self::timestamp()),
            other => Err(DefinitionError::InvalidType(other.to_owned())),
        }
    }

    /// Returns the type tag.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
            Self::Class(class) | Self::Model(class) => class.name(),
        }
    }

    /// Returns the converter this kind implies.
    #[must_use]
    pub fn converter(&self) -> Converter {
        match self {
            Self::Boolean => Arc::new(|raw: Value| {
                Ok(match raw {
                    Value::Bool(b) => Value::Bool(b),
                    other => Value::Bool(other.is_truthy()),
                })
            }),
            Self::Number => Arc::new(|raw: Value| {
                Ok(match raw {
                    Value::Number(n) => Value::Number(n),
                    other => Value::Number(other.to_number()),
                })
            }),
            Self::String => Arc::new(|raw: Value| {
                Ok(match raw {
                    Value::String(s) => Value::String(s),
                    other => Value::String(other.to_display_string()),
                })
            }),
            Self::Object => Arc::new(Ok::<Value, ConversionError>),
            Self::Array => Arc::new(|raw: Value| match raw {
                Value::Array(items) => Ok(Value::Array(items)),
                other => Err(ConversionError::TypeMismatch {
                    expected: "array",
                    found: other.kind_name(),
                }),
            }),
            Self::Class(class) | Self::Model(class) => {
                let class = Arc::clone(class);
                Arc::new(move |raw: Value| {
                    if class.is_instance(&raw) {
                        Ok(raw)
                    } else {
                        class.construct(raw)
                    }
                })
            }
        }
    }

    /// Returns the serializer this kind implies.
    #[must_use]
    pub fn serializer(&self) -> Serializer {
        match self {
            Self::Boolean | Self::Number | Self::String => Arc::new(Value::clone),
            Self::Object => Arc::new(|value: &Value| match value {
                Value::Object(map) => Value::Object(serialize_object(map)),
                other => serialize(other).unwrap_or_default(),
            }),
            Self::Array => Arc::new(|value: &Value| match value {
                Value::Array(items) => Value::Array(serialize_array(items)),
                other => serialize(other).unwrap_or_default(),
            }),
            Self::Class(_) | Self::Model(_) => Arc::new(|value: &Value| {
                value
                    .as_custom()
                    .and_then(|custom| custom.serialize())
                    .unwrap_or_else(|| value.clone())
            }),
        }
    }
}
