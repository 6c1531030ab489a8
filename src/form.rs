//! Submitted form fields.
//!
//! A request's form data is handed to the handler as an explicit
//! [`FormFields`] value. Fields are raw strings until a page descriptor
//! parses them according to their [`FieldKind`].

use crate::db::Value;
use crate::error::{PortalError, Result};
use std::collections::HashMap;

/// How a submitted string is turned into a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Bound verbatim as text, empty strings included.
    Text,
    /// Parsed as a signed integer.
    Integer,
    /// Parsed as a finite floating point number.
    Float,
}

impl FieldKind {
    /// Parses a raw submitted value for the named field.
    pub fn parse(&self, field: &str, raw: &str) -> Result<Value> {
        match self {
            Self::Text => Ok(Value::String(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| PortalError::invalid_field(field, raw)),
            Self::Float => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                _ => Err(PortalError::invalid_field(field, raw)),
            },
        }
    }

    /// Returns the HTML input type used on the entry page.
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer | Self::Float => "number",
        }
    }
}

/// Field names mapped to the raw values submitted with one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    values: HashMap<String, String>,
}

impl FormFields {
    /// Creates an empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field, returning self for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the raw value of a field, if it was submitted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns true if the field was submitted, even with an empty value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of submitted fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for FormFields {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
