//! The form-query handler.
//!
//! One handler serves every page: validate the submission, bind it into the
//! page's statement, execute that statement on a connection opened for this
//! request alone, and render the outcome.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::db::{Connector, QueryResult};
use crate::error::{PortalError, Result};
use crate::form::FormFields;
use crate::pages::{Output, PageDef};
use crate::render;

/// Settings that shape rendering, independent of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Show raw backend error text to the user.
    pub show_error_detail: bool,
    /// Maximum rows rendered for read pages.
    pub max_rows: usize,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            show_error_detail: true,
            max_rows: 1000,
        }
    }
}

impl From<&ServerConfig> for HandlerSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            show_error_detail: config.show_error_detail,
            max_rows: config.max_rows,
        }
    }
}

/// A rendered response and the error that produced it, if any.
#[derive(Debug)]
pub struct Rendered {
    /// Complete HTML document.
    pub html: String,
    /// Why the request failed.
    pub error: Option<PortalError>,
}

/// Serves pages against connections from a [`Connector`].
#[derive(Clone)]
pub struct FormQueryHandler {
    connector: Arc<dyn Connector>,
    settings: HandlerSettings,
}

impl FormQueryHandler {
    /// Creates a handler.
    pub fn new(connector: Arc<dyn Connector>, settings: HandlerSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    /// Runs a page and renders the outcome, success or failure.
    pub async fn handle(&self, page: &PageDef, fields: &FormFields) -> Rendered {
        let start = Instant::now();

        match self.run(page, fields).await {
            Ok(result) => {
                info!(
                    page = page.name,
                    rows = result.row_count,
                    affected = result.rows_affected,
                    query_ms = result.execution_time.as_millis() as u64,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "page served"
                );
                let confirmed = match page.output {
                    Output::Confirmation { field } => fields.get(field).unwrap_or_default(),
                    Output::Table { .. } => "",
                };
                Rendered {
                    html: render::success(page, &result, confirmed),
                    error: None,
                }
            }
            Err(e) if e.is_validation() => {
                warn!(page = page.name, "rejected submission: {e}");
                Rendered {
                    html: render::validation_error(page, &e.to_string()),
                    error: Some(e),
                }
            }
            Err(e) => {
                error!(page = page.name, "{}: {}", e.category(), e);
                let detail = e.detail();
                let shown = self.settings.show_error_detail.then_some(detail.as_str());
                Rendered {
                    html: render::query_error(page, shown),
                    error: Some(e),
                }
            }
        }
    }

    /// Validates, executes and returns the raw result.
    ///
    /// Validation failures return before a connection is requested. Once a
    /// connection is open it is closed whether or not the statement succeeds.
    pub async fn run(&self, page: &PageDef, fields: &FormFields) -> Result<QueryResult> {
        let statement = page.statement(fields)?;

        let mut client = self.connector.connect().await?;
        let result = client.execute(&statement).await;

        if let Err(e) = client.close().await {
            warn!(page = page.name, "failed to release connection: {e}");
        }

        let result = result?;
        Ok(if page.is_write() {
            result
        } else {
            result.truncate(self.settings.max_rows)
        })
    }
}
