//! Literal values carried by filters.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::FormatError;

/// A dynamically typed literal compared against a property.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Char(char),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Bool(_) => "bool",
            FilterValue::Int(_) => "int",
            FilterValue::Double(_) => "double",
            FilterValue::String(_) => "string",
            FilterValue::DateTime(_) => "datetime",
            FilterValue::Char(_) => "char",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Int(v) => Some(*v as f64),
            FilterValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as RFC 3339 text, with fractional seconds only when present.
    pub fn datetime_to_rfc3339(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Decode a value from its wire JSON.
    ///
    /// Integral numbers decode as [`FilterValue::Int`], other numbers as
    /// [`FilterValue::Double`], and strings holding an RFC 3339 timestamp as
    /// [`FilterValue::DateTime`].
    pub fn from_json(value: &Value) -> Result<Self, FormatError> {
        match value {
            Value::Null => Ok(FilterValue::Null),
            Value::Bool(b) => Ok(FilterValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FilterValue::Int(i))
                } else {
                    n.as_f64()
                        .map(FilterValue::Double)
                        .ok_or_else(|| FormatError::shape(format!("number {n} is out of range")))
                }
            }
            Value::String(s) => Ok(match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => FilterValue::DateTime(dt.with_timezone(&Utc)),
                Err(_) => FilterValue::String(s.clone()),
            }),
            Value::Array(_) | Value::Object(_) => Err(FormatError::shape(format!(
                "filter value must be a scalar, found {value}"
            ))),
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Null => f.write_str("null"),
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Int(v) => write!(f, "{v}"),
            FilterValue::Double(v) => write!(f, "{v}"),
            FilterValue::String(s) => f.write_str(s),
            FilterValue::DateTime(dt) => f.write_str(&Self::datetime_to_rfc3339(dt)),
            FilterValue::Char(c) => write!(f, "{c}"),
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Null => serializer.serialize_none(),
            FilterValue::Bool(b) => serializer.serialize_bool(*b),
            FilterValue::Int(v) => serializer.serialize_i64(*v),
            FilterValue::Double(v) => serializer.serialize_f64(*v),
            FilterValue::String(s) => serializer.serialize_str(s),
            FilterValue::DateTime(dt) => serializer.serialize_str(&Self::datetime_to_rfc3339(dt)),
            FilterValue::Char(c) => serializer.serialize_char(*c),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        FilterValue::Int(v as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Double(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::String(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::String(v)
    }
}

impl From<char> for FilterValue {
    fn from(v: char) -> Self {
        FilterValue::Char(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        FilterValue::DateTime(v)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FilterValue::Null)
    }
}
