//! Page descriptors for the form-query handler.
//!
//! Each page is data: the fields it requires, the fixed SQL it runs, how
//! submitted values map onto that SQL's placeholders, and what it renders.
//! The handler contains the only control flow.

mod definitions;

pub use definitions::{ADVANCED_SEARCH, BASIC_SEARCH, BROWSE, INSERT, PAGES};

use crate::db::{Statement, Value};
use crate::error::{PortalError, Result};
use crate::form::{FieldKind, FormFields};
use std::collections::HashMap;

/// Definition of a form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Form field name.
    pub name: &'static str,
    /// Label shown on the entry page.
    pub label: &'static str,
    /// How the submitted value is parsed.
    pub kind: FieldKind,
}

/// Where the value bound to one placeholder comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// The parsed value of a field.
    Field(&'static str),
    /// The parsed value of a field plus a fixed delta (tolerance bounds).
    Offset(&'static str, i64),
}

/// A rendered table column.
#[derive(Debug, Clone, Copy)]
pub struct OutputColumn {
    /// Header cell text.
    pub header: &'static str,
    /// Result column the cell is read from.
    pub column: &'static str,
}

/// What a page renders on success.
#[derive(Debug, Clone, Copy)]
pub enum Output {
    /// One table row per result row, columns in declared order.
    Table {
        caption: &'static str,
        columns: &'static [OutputColumn],
    },
    /// A single line naming the value of `field`.
    Confirmation { field: &'static str },
}

/// Definition of a page.
#[derive(Debug, Clone, Copy)]
pub struct PageDef {
    /// Page name, used in logs.
    pub name: &'static str,
    /// Route the page's form posts to.
    pub route: &'static str,
    /// Document title.
    pub title: &'static str,
    /// Whether the page also answers GET requests.
    pub allow_get: bool,
    /// Fields that must be submitted.
    pub required: &'static [FieldDef],
    /// Fields that may be omitted; absent text binds as an empty string.
    pub optional: &'static [FieldDef],
    /// Fixed SQL text with `$n` placeholders.
    pub sql: &'static str,
    /// Placeholder sources, `params[0]` binds `$1`.
    pub params: &'static [Param],
    /// Success rendering.
    pub output: Output,
}

impl PageDef {
    /// Returns true if the page writes rather than reads.
    pub fn is_write(&self) -> bool {
        matches!(self.output, Output::Confirmation { .. })
    }

    /// All fields the page accepts, required first.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Checks presence of every required field and parses every accepted
    /// field, returning the parsed values by field name.
    ///
    /// Required fields are checked in declared order; the first absent one
    /// is reported.
    pub fn validate(&self, fields: &FormFields) -> Result<HashMap<&'static str, Value>> {
        if let Some(missing) = self.required.iter().find(|f| !fields.contains(f.name)) {
            return Err(PortalError::missing_field(missing.name));
        }

        let mut values = HashMap::new();
        for def in self.required {
            let raw = fields.get(def.name).unwrap_or_default();
            values.insert(def.name, def.kind.parse(def.name, raw)?);
        }
        for def in self.optional {
            let value = match fields.get(def.name) {
                Some(raw) => def.kind.parse(def.name, raw)?,
                None if def.kind == FieldKind::Text => Value::String(String::new()),
                None => Value::Null,
            };
            values.insert(def.name, value);
        }
        Ok(values)
    }

    /// Validates the submission and binds it into the page's statement.
    pub fn statement(&self, fields: &FormFields) -> Result<Statement> {
        let values = self.validate(fields)?;

        let params = self
            .params
            .iter()
            .map(|param| resolve(param, &values))
            .collect::<Result<Vec<_>>>()?;

        Ok(if self.is_write() {
            Statement::write(self.sql, params)
        } else {
            Statement::read(self.sql, params)
        })
    }
}

/// Computes the value bound for one placeholder.
fn resolve(param: &Param, values: &HashMap<&'static str, Value>) -> Result<Value> {
    let (name, delta) = match *param {
        Param::Field(name) => (name, 0),
        Param::Offset(name, delta) => (name, delta),
    };

    let value = values
        .get(name)
        .ok_or_else(|| PortalError::internal(format!("placeholder source '{name}' is not a field")))?;

    match (value, delta) {
        (value, 0) => Ok(value.clone()),
        (Value::Int(v), d) => Ok(Value::Int(v.saturating_add(d))),
        (Value::Float(v), d) => Ok(Value::Float(v + d as f64)),
        (other, _) => Err(PortalError::internal(format!(
            "cannot offset non-numeric field '{name}' ({other:?})"
        ))),
    }
}
