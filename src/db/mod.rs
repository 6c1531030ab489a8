//! Database abstraction layer for grad-portal.
//!
//! Provides a trait-based interface for database operations, allowing
//! different database backends to be used interchangeably. Every request
//! opens its own connection through a [`Connector`] and closes it before the
//! response is sent.

mod mock;
mod postgres;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockConnector, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Statement, StatementKind, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Sqlite => 0,
        }
    }
}

/// Timeouts applied to every connection a [`SqlxConnector`] opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Limit for establishing the connection.
    pub connect: Duration,
    /// Limit for a single statement.
    pub query: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            query: Duration::from_secs(30),
        }
    }
}

/// Opens a database client for the given backend and configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(
    config: &ConnectionConfig,
    timeouts: Timeouts,
) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let client = PostgresClient::connect(config, timeouts).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(config, timeouts).await?;
            Ok(Box::new(client))
        }
    }
}

/// A single open database connection.
///
/// All operations are async and return Results with PortalError.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes a statement with its bound parameters.
    async fn execute(&mut self, statement: &Statement) -> Result<QueryResult>;

    /// Closes the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Source of per-request database connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new connection.
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>>;
}

/// Connector that opens real sqlx connections from a [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct SqlxConnector {
    config: ConnectionConfig,
    timeouts: Timeouts,
}

impl SqlxConnector {
    /// Creates a connector for the given configuration.
    pub fn new(config: ConnectionConfig, timeouts: Timeouts) -> Self {
        Self { config, timeouts }
    }
}

#[async_trait]
impl Connector for SqlxConnector {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>> {
        connect(&self.config, self.timeouts).await
    }
}
