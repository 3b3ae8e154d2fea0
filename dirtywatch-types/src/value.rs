//! Typed field values.
//!
//! A record holds one [`FieldValue`] per declared field. The declared
//! [`FieldType`] decides which variants a field accepts and how JSON input is
//! converted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result, Timestamp};

/// The declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Bool,
    DateTime,
    Integer,
    Float,
}

impl FieldType {
    /// Lower-case name used in errors and JSON.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bool => "bool",
            Self::DateTime => "date_time",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field value.
///
/// `Null` is accepted by every field type and stands for "no value yet"
/// (for example a creation timestamp before the first persist).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Bool(bool),
    DateTime(Timestamp),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    /// The type of this value, or `None` for `Null`.
    #[must_use]
    pub const fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Null => None,
            Self::Text(_) => Some(FieldType::Text),
            Self::Bool(_) => Some(FieldType::Bool),
            Self::DateTime(_) => Some(FieldType::DateTime),
            Self::Integer(_) => Some(FieldType::Integer),
            Self::Float(_) => Some(FieldType::Float),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this value may be stored in a field of type `ty`.
    #[must_use]
    pub fn conforms_to(&self, ty: FieldType) -> bool {
        self.field_type().is_none_or(|own| own == ty)
    }

    /// Change-detection equality.
    ///
    /// Text, booleans and integers compare exactly. Floats compare by total
    /// order, so `NaN` is the same as `NaN` and `-0.0` differs from `0.0`.
    /// Date-times compare by instant. Values of different types never match.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::DateTime(ts) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts plain JSON into a value of the declared type.
    ///
    /// Date-times accept RFC 3339 strings or integer epoch milliseconds.
    /// Floats accept any JSON number.
    pub fn from_json(ty: FieldType, json: &serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;

        let invalid = || Error::InvalidValue {
            expected: ty,
            found: json.to_string(),
        };

        match (ty, json) {
            (_, Json::Null) => Ok(Self::Null),
            (FieldType::Text, Json::String(s)) => Ok(Self::Text(s.clone())),
            (FieldType::Bool, Json::Bool(b)) => Ok(Self::Bool(*b)),
            (FieldType::Integer, Json::Number(n)) => n.as_i64().map(Self::Integer).ok_or_else(invalid),
            (FieldType::Float, Json::Number(n)) => n.as_f64().map(Self::Float).ok_or_else(invalid),
            (FieldType::DateTime, Json::String(s)) => Ok(Self::DateTime(Timestamp::parse(s)?)),
            (FieldType::DateTime, Json::Number(n)) => {
                let millis = n.as_i64().ok_or_else(invalid)?;
                Ok(Self::DateTime(Timestamp::from_millis(millis)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Plain JSON representation (date-times as RFC 3339 strings).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Text(s) => Json::String(s.clone()),
            Self::Bool(b) => Json::Bool(*b),
            Self::DateTime(ts) => Json::String(ts.to_string()),
            Self::Integer(n) => Json::from(*n),
            Self::Float(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::DateTime(ts) => write!(f, "{ts}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        Self::DateTime(ts)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
