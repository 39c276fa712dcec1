//! Error types for request validation
//!
//! Every validation failure is reported as the first error encountered:
//! binding stops at the first field that does not pass, and cross-field
//! rules only run once every field has passed on its own.

use thiserror::Error;

use crate::value::ValueType;

/// Error raised while binding an input mapping to a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or explicitly null
    #[error("Field '{field}' is required")]
    MissingField { field: String },

    /// A non-nullable field received an empty value
    #[error("Field '{field}' cannot have empty value")]
    EmptyValue { field: String },

    /// The runtime type of the value is not accepted by the field
    #[error("Field '{field}' must be '{expected}', but got '{actual}'")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: ValueType,
    },

    /// The value is well-typed but semantically invalid
    #[error("Field '{field}' is invalid: {reason}")]
    Format { field: String, reason: String },

    /// No acceptable combination of fields was provided
    #[error("Request validation failed: {reason}")]
    CrossField { reason: String },
}

impl ValidationError {
    /// Create a missing field error
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingField {
            field: field.into(),
        }
    }

    /// Create an empty value error
    pub fn empty(field: impl Into<String>) -> Self {
        ValidationError::EmptyValue {
            field: field.into(),
        }
    }

    /// Create a format error
    pub fn format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Format {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a cross-field error
    pub fn cross_field(reason: impl Into<String>) -> Self {
        ValidationError::CrossField {
            reason: reason.into(),
        }
    }

    /// Name of the offending field, if the error belongs to a single field
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::EmptyValue { field }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::Format { field, .. } => Some(field),
            ValidationError::CrossField { .. } => None,
        }
    }

    /// Short machine-readable kind, used for logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "missing_field",
            ValidationError::EmptyValue { .. } => "empty_value",
            ValidationError::TypeMismatch { .. } => "type_mismatch",
            ValidationError::Format { .. } => "format",
            ValidationError::CrossField { .. } => "cross_field",
        }
    }
}

/// Error raised while declaring a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field name '{0}' in schema")]
    DuplicateField(String),
}

/// Result type alias for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;
