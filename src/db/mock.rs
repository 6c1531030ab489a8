//! Mock database clients for testing.
//!
//! Provides in-memory connectors that record every connection and statement,
//! so tests can assert what reached the database without running one.

use super::{Connector, DatabaseClient, QueryResult, Statement};
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of what a [`MockConnector`] has seen.
#[derive(Debug, Default)]
struct Recorder {
    connects: AtomicUsize,
    closes: AtomicUsize,
    statements: Mutex<Vec<Statement>>,
}

impl Recorder {
    fn record(&self, statement: &Statement) {
        self.statements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(statement.clone());
    }
}

/// How connections handed out by a [`MockConnector`] behave.
#[derive(Debug, Clone)]
enum Behavior {
    Respond(QueryResult),
    FailExecute(String),
    FailConnect(String),
}

/// A connector that hands out mock clients and records their use.
#[derive(Debug, Clone)]
pub struct MockConnector {
    recorder: Arc<Recorder>,
    behavior: Behavior,
}

impl MockConnector {
    /// Every statement succeeds with the given result.
    pub fn returning(result: QueryResult) -> Self {
        Self {
            recorder: Arc::default(),
            behavior: Behavior::Respond(result),
        }
    }

    /// Connections open, but every statement fails with `detail`.
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            recorder: Arc::default(),
            behavior: Behavior::FailExecute(detail.into()),
        }
    }

    /// Connecting itself fails with `detail`.
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            recorder: Arc::default(),
            behavior: Behavior::FailConnect(detail.into()),
        }
    }

    /// Number of connection attempts.
    pub fn connect_count(&self) -> usize {
        self.recorder.connects.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn close_count(&self) -> usize {
        self.recorder.closes.load(Ordering::SeqCst)
    }

    /// Statements executed so far, in order.
    pub fn statements(&self) -> Vec<Statement> {
        self.recorder
            .statements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>> {
        self.recorder.connects.fetch_add(1, Ordering::SeqCst);
        let recorder = Arc::clone(&self.recorder);

        match &self.behavior {
            Behavior::Respond(result) => Ok(Box::new(MockDatabaseClient {
                recorder,
                result: result.clone(),
            })),
            Behavior::FailExecute(detail) => Ok(Box::new(FailingDatabaseClient {
                recorder,
                detail: detail.clone(),
            })),
            Behavior::FailConnect(detail) => Err(PortalError::connection(detail.clone())),
        }
    }
}

/// A mock client that returns a predefined result for every statement.
#[derive(Debug)]
pub struct MockDatabaseClient {
    recorder: Arc<Recorder>,
    result: QueryResult,
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        self.recorder.record(statement);
        Ok(self.result.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock client whose statements always fail.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    recorder: Arc<Recorder>,
    detail: String,
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        self.recorder.record(statement);
        Err(PortalError::query(self.detail.clone()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
