// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built-in timestamp property type.

use core::any::Any;
use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, SubsecRound, Utc};

use crate::error::ConversionError;
use crate::kind::Class;
use crate::value::{CustomValue, Value};

const TYPE_NAME: &str = "Timestamp";

/// A UTC instant with millisecond precision.
///
/// Serializes to the fixed `YYYY-MM-DDTHH:MM:SS.sssZ` form and is rebuilt
/// from it, from any RFC 3339 string, from a bare `YYYY-MM-DD` date, or from
/// epoch milliseconds.
///
/// # Example
///
/// ```rust
/// use tessel_property::{Timestamp, Value};
///
/// let ts = Timestamp::from_value(Value::from("2015-03-01T10:20:30Z")).unwrap();
/// assert_eq!(ts.to_string(), "2015-03-01T10:20:30.000Z");
/// assert_eq!(Timestamp::from_value(Value::from(ts.millis() as f64)).unwrap(), ts);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant.
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Builds a timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Parses an RFC 3339 string or a bare `YYYY-MM-DD` date (midnight UTC).
    ///
    /// Sub-millisecond digits are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Construct`] if the text is neither.
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from(datetime.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|date| Self(date.and_time(NaiveTime::MIN).and_utc()))
            .map_err(|err| construct_error(format!("invalid date '{text}': {err}")))
    }

    /// Builds a timestamp from a plain value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Construct`] for values that describe no
    /// instant.
    pub fn from_value(value: Value) -> Result<Self, ConversionError> {
        match &value {
            Value::String(text) => Self::parse(text),
            Value::Number(n) if n.is_finite() => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "out of range instants are rejected below"
                )]
                let millis = n.trunc() as i64;
                Self::from_millis(millis).ok_or_else(|| construct_error(format!("{n} is out of range")))
            }
            Value::Custom(custom) => custom
                .downcast_ref::<Self>()
                .copied()
                .ok_or_else(|| construct_error(format!("cannot convert a {}", custom.type_name()))),
            other => Err(construct_error(format!("cannot convert a {}", other.kind_name()))),
        }
    }

    /// The class used by [`PropertyKind::timestamp`](crate::PropertyKind::timestamp).
    #[must_use]
    pub fn class() -> Class<Self> {
        Class::new(TYPE_NAME, Self::from_value)
    }

    /// Returns the instant.
    #[must_use]
    #[inline]
    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns milliseconds since the Unix epoch.
    #[must_use]
    #[inline]
    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

fn construct_error(reason: String) -> ConversionError {
    ConversionError::Construct {
        type_name: TYPE_NAME.to_owned(),
        reason,
    }
}

/// Truncates `datetime` to whole milliseconds.
impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(3))
    }
}

impl From<Timestamp> for Value {
    fn from(timestamp: Timestamp) -> Self {
        Self::Custom(Box::new(timestamp))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl CustomValue for Timestamp {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn serialize(&self) -> Option<Value> {
        Some(Value::String(self.to_string()))
    }

    fn to_primitive(&self) -> Option<Value> {
        Some(Value::Number(self.millis() as f64))
    }

    fn clone_boxed(&self) -> Box<dyn CustomValue> {
        Box::new(*self)
    }

    fn eq_custom(&self, other: &dyn CustomValue) -> bool {
        other.downcast_ref::<Self>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
