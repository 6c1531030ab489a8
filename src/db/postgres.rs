//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{
    ColumnInfo, DatabaseClient, QueryResult, Row, Statement, StatementKind, Timeouts, Value,
};
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgConnection, PgRow};
use sqlx::query::Query;
use sqlx::{Column as SqlxColumn, Connection, Postgres, Row as SqlxRow, TypeInfo};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// PostgreSQL database client holding one dedicated connection.
#[derive(Debug)]
pub struct PostgresClient {
    conn: PgConnection,
    query_timeout: Duration,
}

impl PostgresClient {
    /// Opens a connection, failing if it cannot be established within the
    /// connect timeout.
    pub async fn connect(config: &ConnectionConfig, timeouts: Timeouts) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        let mut options = PgConnectOptions::from_str(&conn_str)
            .map_err(|e| PortalError::config(format!("Invalid connection string: {e}")))?;

        if let Some(schema) = &config.schema {
            options = options.options([("search_path", schema.as_str())]);
        }

        let conn = tokio::time::timeout(timeouts.connect, PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                PortalError::connection(format!(
                    "Connection to {} timed out after {:?}",
                    config.display_string(),
                    timeouts.connect
                ))
            })?
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Connected to {}", config.display_string());

        Ok(Self {
            conn,
            query_timeout: timeouts.query,
        })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        let start = Instant::now();
        let limit = self.query_timeout;
        let query = bind_params(sqlx::query(statement.sql), &statement.params);

        let result = match statement.kind {
            StatementKind::Read => {
                let rows = tokio::time::timeout(limit, query.fetch_all(&mut self.conn))
                    .await
                    .map_err(|_| timed_out(limit))?
                    .map_err(|e| PortalError::query(format_query_error(e)))?;

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
                    .map_err(|e| PortalError::query(format_query_error(e)))?;

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
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [Value],
) -> Query<'q, Postgres, PgArguments> {
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

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value by its reported PostgreSQL type name.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    fn get<'r, T>(row: &'r PgRow, index: usize) -> Option<T>
    where
        T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        row.try_get::<Option<T>, _>(index).ok().flatten()
    }

    let value = match type_name {
        "BOOL" => get::<bool>(row, index).map(Value::Bool),
        "INT2" => get::<i16>(row, index).map(|v| Value::Int(v.into())),
        "INT4" => get::<i32>(row, index).map(|v| Value::Int(v.into())),
        "INT8" => get::<i64>(row, index).map(Value::Int),
        "FLOAT4" => get::<f32>(row, index).map(|v| Value::Float(v.into())),
        "FLOAT8" => get::<f64>(row, index).map(Value::Float),
        "BYTEA" => get::<Vec<u8>>(row, index).map(Value::Bytes),
        // TEXT, VARCHAR, BPCHAR, NAME
        _ => get::<String>(row, index).map(Value::String),
    };
    value.unwrap_or(Value::Null)
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> PortalError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        PortalError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        PortalError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        PortalError::connection(format!("Database '{database}' does not exist."))
    } else {
        PortalError::connection(error.to_string())
    }
}

/// Formats a query error with the server's detail and hint, when present.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(constraint) = pg_error.constraint() {
            result.push_str("\n  CONSTRAINT: ");
            result.push_str(constraint);
        }
    }

    result
}
