//! Schema engine
//!
//! A [`Schema`] is an ordered list of field specs with unique names. Binding
//! an input mapping assigns each declared field, in declaration order, and
//! stops at the first field that fails. There is no aggregated report: the
//! first error wins.

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Result, SchemaError};
use crate::field::{Field, FieldSpec};
use crate::value::FieldValue;

/// Ordered set of declared fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Create a schema, rejecting duplicate field names
    pub fn new(fields: Vec<FieldSpec>) -> std::result::Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(SchemaError::DuplicateField(field.name().to_string()));
            }
        }
        Ok(Self { fields })
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSpec::name)
    }

    /// Validate an input mapping against every declared field
    pub fn bind(&self, input: &Map<String, Value>) -> Result<BoundFields> {
        self.bind_at(input, Local::now().date_naive())
    }

    /// Same as [`Schema::bind`], with an explicit current date for
    /// date-relative checks
    pub fn bind_at(&self, input: &Map<String, Value>, today: NaiveDate) -> Result<BoundFields> {
        let mut values = Vec::with_capacity(self.fields.len());

        for spec in &self.fields {
            let mut field = Field::with_today(spec, today);
            if let Err(err) = field.assign(input.get(spec.name()).cloned()) {
                tracing::debug!(
                    field = spec.name(),
                    kind = err.kind(),
                    error = %err,
                    "Field validation failed"
                );
                return Err(err);
            }
            values.push((spec.name().to_string(), field.into_value()));
        }

        Ok(BoundFields { values })
    }

    /// Names of declared fields that were given a non-null value in the
    /// input, in declaration order. Independent of validation outcome.
    pub fn provided_field_names(&self, input: &Map<String, Value>) -> Vec<String> {
        self.fields
            .iter()
            .filter(|spec| input.get(spec.name()).map_or(false, |v| !v.is_null()))
            .map(|spec| spec.name().to_string())
            .collect()
    }
}

/// Validated values of one bind pass
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFields {
    values: Vec<(String, Option<FieldValue>)>,
}

impl BoundFields {
    /// Value of a field, `None` when absent
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Whether a field holds a non-null value
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).map_or(false, |v| !v.is_null())
    }

    /// Whether a field holds a truthy value
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).map_or(false, FieldValue::is_truthy)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.str(name).map(str::to_string)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(FieldValue::as_date)
    }

    pub fn object(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(FieldValue::as_object)
    }

    pub fn int_list(&self, name: &str) -> Option<Vec<i64>> {
        self.get(name).and_then(FieldValue::as_int_list)
    }
}
