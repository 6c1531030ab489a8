//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient` trait
//! for SQLite database files using sqlx. Placeholders use the same `$n` form
//! as PostgreSQL, so page statements run unchanged on either backend.

use crate::config::ConnectionConfig;
use crate::db::{
    ColumnInfo, DatabaseClient, QueryResult, Row, Statement, StatementKind, Timeouts, Value,
};
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, Connection, Row as SqlxRow, Sqlite, TypeInfo};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// SQLite database client holding one dedicated connection.
#[derive(Debug)]
pub struct SqliteClient {
    conn: SqliteConnection,
    query_timeout: Duration,
}

impl SqliteClient {
    /// Opens an existing database file. Missing files are an error.
    pub async fn connect(config: &ConnectionConfig, timeouts: Timeouts) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| PortalError::config(format!("Invalid database path: {e}")))?
            // Lock waits outlast the statement limit, so a held lock surfaces
            // as a statement timeout rather than SQLITE_BUSY.
            .busy_timeout(timeouts.query + timeouts.connect);

        let conn = tokio::time::timeout(timeouts.connect, SqliteConnection::connect_with(&options))
            .await
            .map_err(|_| {
                PortalError::connection(format!(
                    "Opening {} timed out after {:?}",
                    config.display_string(),
                    timeouts.connect
                ))
            })?
            .map_err(|e| {
                PortalError::connection(format!(
                    "Cannot open {}: {e}",
                    config.display_string()
                ))
            })?;

        debug!("Opened {}", config.display_string());

        Ok(Self {
            conn,
            query_timeout: timeouts.query,
        })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        let start = Instant::now();
        let limit = self.query_timeout;
        let query = bind_params(sqlx::query(statement.sql), &statement.params);

        let result = match statement.kind {
            StatementKind::Read => {
                let rows = tokio::time::timeout(limit, query.fetch_all(&mut self.conn))
                    .await
                    .map_err(|_| timed_out(limit))?
                    .map_err(|e| PortalError::query(e.to_string()))?;

                let columns: Vec<ColumnInfo> = rows
                    .first()
                    .map(|row| {
                        row.columns()
                            .iter()
                            .map(|col| ColumnInfo::new(col.name()))
                            .collect()
                    })
                    .unwrap_or_default();

                QueryResult::with_data(columns, rows.iter().map(convert_row).collect())
            }
            StatementKind::Write => {
                let done = tokio::time::timeout(limit, query.execute(&mut self.conn))
                    .await
                    .map_err(|_| timed_out(limit))?
                    .map_err(|e| PortalError::query(e.to_string()))?;

                QueryResult::affected(done.rows_affected())
            }
        };

        Ok(result.with_execution_time(start.elapsed()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| PortalError::connection(format!("Failed to close connection: {e}")))
    }
}

fn timed_out(limit: Duration) -> PortalError {
    PortalError::query(format!("Query timed out after {} seconds", limit.as_secs()))
}

/// Binds each value to the next `$n` placeholder.
fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::String(s) => query.bind(s.as_str()),
            Value::Bytes(b) => query.bind(b.as_slice()),
        };
    }
    query
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value.
///
/// Expression columns carry no declared type, so anything not declared as
/// BOOLEAN or BLOB is tried as integer, then real, then text.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        _ => {
            if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(index) {
                Value::Int(v)
            } else if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(index) {
                Value::Float(v)
            } else {
                row.try_get::<Option<String>, _>(index)
                    .ok()
                    .flatten()
                    .map(Value::String)
                    .unwrap_or(Value::Null)
            }
        }
    }
}
