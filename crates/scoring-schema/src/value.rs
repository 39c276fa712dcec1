//! Runtime value model for untyped request bodies
//!
//! Request bodies arrive as `serde_json::Value`. This module classifies
//! those values into runtime types, decides truthiness and emptiness, and
//! holds the normalized form a field stores after validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Runtime type of an incoming JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Classify a JSON value. Booleans are never integers.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueType::Integer,
            Value::Number(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Null => write!(f, "null"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "float"),
            ValueType::String => write!(f, "string"),
            ValueType::Array => write!(f, "array"),
            ValueType::Object => write!(f, "object"),
        }
    }
}

/// Whether a value counts as "present" for validation purposes.
///
/// `null`, `false`, zero, the empty string, the empty array and the empty
/// object are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Whether a value is one of the recognized empty sentinels:
/// `""`, `{}`, `[]` or `null`. Zero and `false` are not empty.
pub fn is_empty_sentinel(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Value held by a field after assignment.
///
/// Most fields keep the raw JSON value. Date fields replace the raw string
/// with the parsed calendar date once validation succeeds, and phone fields
/// replace an integer with its decimal string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Raw(Value),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Raw(value) => is_truthy(value),
            FieldValue::Date(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Raw(Value::Null))
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            FieldValue::Raw(value) => Some(value),
            FieldValue::Date(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_raw().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_raw().and_then(Value::as_i64)
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.as_raw().and_then(Value::as_object)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            FieldValue::Raw(_) => None,
        }
    }

    /// Elements of an array value that fit in `i64`
    pub fn as_int_list(&self) -> Option<Vec<i64>> {
        self.as_raw()
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Raw(value)
    }
}
