//! Field descriptors
//!
//! A [`FieldSpec`] declares the constraints of one named field: its kind,
//! whether it is required and whether it may hold an empty value. Specs are
//! immutable once declared. A [`Field`] pairs a spec with the value slot of a
//! single validation attempt.
//!
//! Validation runs the following checks in order and stops at the first one
//! that fails:
//!
//! 1. required and absent (missing key or `null`) → `MissingField`
//! 2. not nullable and an empty sentinel → `EmptyValue`
//! 3. truthy value of a type the kind does not accept → `TypeMismatch`
//! 4. truthy value rejected by the kind's refinement → `Format`

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Result, ValidationError};
use crate::value::{is_empty_sentinel, is_truthy, FieldValue, ValueType};

/// Format accepted by date and birthday fields, for messages
pub const DATE_FORMAT: &str = "dd.mm.yyyy";

/// Exclusive upper bound on the age a birthday may imply
pub const MAX_AGE_YEARS: i32 = 70;

/// Required length of a phone number
pub const PHONE_LENGTH: usize = 11;

/// Gender enumeration accepted by gender fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Unknown = 0,
    Male = 1,
    Female = 2,
}

impl Gender {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Gender::Unknown),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a field, selecting its accepted types and refinement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain string
    Char,
    /// Nested mapping of method arguments
    Arguments,
    /// String containing `@` and `.`
    Email,
    /// 11 digit number starting with 7, as string or integer
    Phone,
    /// `dd.mm.yyyy` date
    Date,
    /// `dd.mm.yyyy` date implying an age between 1 and 69 years
    Birthday,
    /// Integer gender code
    Gender,
    /// Non-empty list of integer client ids
    ClientIds,
}

impl FieldKind {
    /// Runtime types accepted by this kind, or `None` for any type
    pub fn expected_types(&self) -> Option<&'static [ValueType]> {
        match self {
            FieldKind::Char | FieldKind::Email | FieldKind::Date | FieldKind::Birthday => {
                Some(&[ValueType::String])
            }
            FieldKind::Arguments => Some(&[ValueType::Object]),
            FieldKind::Phone => Some(&[ValueType::String, ValueType::Integer]),
            FieldKind::Gender => Some(&[ValueType::Integer]),
            FieldKind::ClientIds => Some(&[ValueType::Array]),
        }
    }

    /// Kind-specific check run on a truthy, well-typed value.
    ///
    /// Returns the value the field should store on success, or a
    /// human-readable reason on failure.
    pub fn refine(&self, value: &Value, today: NaiveDate) -> std::result::Result<FieldValue, String> {
        match self {
            FieldKind::Char | FieldKind::Arguments => Ok(FieldValue::Raw(value.clone())),
            FieldKind::Email => {
                let email = value.as_str().unwrap_or_default();
                if email.contains('@') && email.contains('.') {
                    Ok(FieldValue::Raw(value.clone()))
                } else {
                    Err("Email must contain '@' and '.' symbols".to_string())
                }
            }
            FieldKind::Phone => refine_phone(value),
            FieldKind::Date => parse_date(value).map(FieldValue::Date),
            FieldKind::Birthday => {
                let date = parse_date(value)?;
                let age = today.year() - date.year();
                if age <= 0 {
                    return Err("Birthday is too close".to_string());
                }
                if age >= MAX_AGE_YEARS {
                    return Err("Birthday is too far away".to_string());
                }
                Ok(FieldValue::Date(date))
            }
            FieldKind::Gender => match value.as_i64().and_then(Gender::from_code) {
                Some(_) => Ok(FieldValue::Raw(value.clone())),
                None => Err(format!(
                    "Gender must be one of 0 (unknown), 1 (male), 2 (female), but got '{}'",
                    value
                )),
            },
            FieldKind::ClientIds => {
                // ids must fit in i64, larger integers are not client ids
                let all_ints = value
                    .as_array()
                    .map(|ids| ids.iter().all(|id| id.as_i64().is_some()))
                    .unwrap_or(false);
                if all_ints {
                    Ok(FieldValue::Raw(value.clone()))
                } else {
                    Err("ClientIDs must be a list of int".to_string())
                }
            }
        }
    }
}

fn refine_phone(value: &Value) -> std::result::Result<FieldValue, String> {
    let phone = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    if phone.chars().count() != PHONE_LENGTH {
        return Err(format!("Phone number must be {} digits long", PHONE_LENGTH));
    }
    if !phone.starts_with('7') {
        return Err("Phone number must start with '7'".to_string());
    }
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number must contain only digits".to_string());
    }
    Ok(FieldValue::Raw(Value::String(phone)))
}

/// Parse a strict `dd.mm.yyyy` date
fn parse_date(value: &Value) -> std::result::Result<NaiveDate, String> {
    let wrong_format = || format!("Date field has wrong format. '{}' expected", DATE_FORMAT);
    let text = value.as_str().ok_or_else(wrong_format)?;

    let parts: Vec<&str> = text.split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(wrong_format());
    };
    let shape_ok = [(day, 2usize), (month, 2), (year, 4)]
        .iter()
        .all(|(part, len)| part.len() == *len && part.chars().all(|c| c.is_ascii_digit()));
    if !shape_ok {
        return Err(wrong_format());
    }

    let (Ok(day), Ok(month), Ok(year)) = (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>())
    else {
        return Err(wrong_format());
    };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(wrong_format)
}

/// Declared constraints of a single named field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
    nullable: bool,
}

impl FieldSpec {
    /// Declare an optional, non-nullable field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            nullable: false,
        }
    }

    /// Set whether the field must be present
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set whether the field may hold an empty value
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Human-readable list of accepted types
    pub fn expected_type_name(&self) -> String {
        match self.kind.expected_types() {
            Some(types) => types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            None => "any".to_string(),
        }
    }
}

/// A field spec bound to the value of one validation attempt
#[derive(Debug, Clone)]
pub struct Field<'s> {
    spec: &'s FieldSpec,
    value: Option<FieldValue>,
    today: NaiveDate,
}

impl<'s> Field<'s> {
    /// Bind a spec using the local calendar date for birthday checks
    pub fn new(spec: &'s FieldSpec) -> Self {
        Self::with_today(spec, Local::now().date_naive())
    }

    pub fn with_today(spec: &'s FieldSpec, today: NaiveDate) -> Self {
        Self {
            spec,
            value: None,
            today,
        }
    }

    pub fn spec(&self) -> &FieldSpec {
        self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Current value. `None` when nothing was assigned.
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    /// Consume the field, returning its value
    pub fn into_value(self) -> Option<FieldValue> {
        self.value
    }

    /// Store a candidate value and validate it.
    ///
    /// On failure the candidate stays stored so callers can inspect it, but
    /// the field must be treated as invalid.
    pub fn assign(&mut self, value: Option<Value>) -> Result<()> {
        self.value = value.map(FieldValue::Raw);
        self.validate()
    }

    /// Clear the value so the field can serve another validation attempt
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Run the ordered checks against the current value
    pub fn validate(&mut self) -> Result<()> {
        let spec = self.spec;
        let raw = match &self.value {
            None => None,
            Some(FieldValue::Raw(value)) => Some(value),
            // Already normalized by an earlier successful pass
            Some(FieldValue::Date(_)) => return Ok(()),
        };

        if spec.required && raw.map_or(true, Value::is_null) {
            return Err(ValidationError::missing(&spec.name));
        }

        if !spec.nullable && raw.map_or(true, is_empty_sentinel) {
            return Err(ValidationError::empty(&spec.name));
        }

        let Some(raw) = raw.filter(|value| is_truthy(value)) else {
            return Ok(());
        };

        if let Some(expected) = spec.kind.expected_types() {
            let actual = ValueType::of(raw);
            if !expected.contains(&actual) {
                return Err(ValidationError::TypeMismatch {
                    field: spec.name.clone(),
                    expected: spec.expected_type_name(),
                    actual,
                });
            }
        }

        let refined = spec.kind.refine(raw, self.today);
        match refined {
            Ok(normalized) => {
                self.value = Some(normalized);
                Ok(())
            }
            Err(reason) => Err(ValidationError::format(&spec.name, reason)),
        }
    }
}
