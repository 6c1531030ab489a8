//! Statement and result types for grad-portal.
//!
//! Defines the structures passed to and returned from database clients.

use std::fmt;
use std::time::Duration;

/// Whether a statement returns rows or modifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// SELECT-style statement; rows are fetched.
    Read,
    /// INSERT-style statement; only the affected row count is reported.
    Write,
}

/// A fixed SQL text plus the values bound to its `$n` placeholders.
///
/// The text never contains submitted data; every submitted value travels in
/// `params`, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `$1`, `$2`, ... placeholders.
    pub sql: &'static str,

    /// Bound values, `params[0]` binds `$1`.
    pub params: Vec<Value>,

    /// Whether rows are fetched or only counted.
    pub kind: StatementKind,
}

impl Statement {
    /// Creates a read statement.
    pub fn read(sql: &'static str, params: Vec<Value>) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::Read,
        }
    }

    /// Creates a write statement.
    pub fn write(sql: &'static str, params: Vec<Value>) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::Write,
        }
    }
}

/// Represents the result of executing a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Time taken to execute the statement.
    pub execution_time: Duration,

    /// Number of rows in the result (may be truncated).
    pub row_count: usize,

    /// Total number of rows before truncation (if known).
    pub total_rows: Option<usize>,

    /// Whether the result was truncated due to exceeding the row limit.
    pub was_truncated: bool,

    /// Rows inserted or changed by a write statement.
    pub rows_affected: u64,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            total_rows: Some(row_count),
            ..Self::default()
        }
    }

    /// Creates the result of a write statement.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Keeps at most `max_rows` rows, recording whether anything was dropped.
    pub fn truncate(mut self, max_rows: usize) -> Self {
        let total = self.rows.len();
        if total > max_rows {
            self.rows.truncate(max_rows);
            self.was_truncated = true;
        }
        self.row_count = self.rows.len();
        self.total_rows = Some(total);
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of the named column, ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    /// Returns a truncation warning message if the result was truncated.
    pub fn truncation_warning(&self) -> Option<String> {
        if self.was_truncated {
            let total = self.total_rows.unwrap_or(self.row_count);
            Some(format!(
                "Result truncated: showing {} of {} rows",
                self.row_count, total
            ))
        } else {
            None
        }
    }
}

/// A result column, matched against a page's declared output columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single value, either bound as a parameter or read back from a row.
///
/// Form input only ever produces `String`, `Int` and `Float`; the other
/// variants come back from columns this crate does not write.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Text for a table cell. NULL renders as an empty cell and whole floats
    /// drop their fraction (`4.0` shows as `4`).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}
