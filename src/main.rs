//! grad-portal - graduate admissions search and entry pages.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use cli::Cli;
use grad_portal::config::{Config, ConnectionConfig};
use grad_portal::db::{DatabaseBackend, SqlxConnector, Timeouts};
use grad_portal::error::{PortalError, Result};
use grad_portal::handler::{FormQueryHandler, HandlerSettings};
use grad_portal::{logging, server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_server_overrides(&mut config.server);

    let connection = resolve_connection(&cli, &config)?
        .context("No database connection configured. Use --help for usage information.")?;
    info!(
        backend = connection.backend.as_str(),
        "Connection: {}",
        connection.display_string()
    );

    let timeouts = Timeouts {
        connect: config.server.connect_timeout(),
        query: config.server.query_timeout(),
    };
    let connector = SqlxConnector::new(connection, timeouts);
    let handler = FormQueryHandler::new(
        Arc::new(connector),
        HandlerSettings::from(&config.server),
    );

    server::serve(handler, &config.server.listen)
        .await
        .context("server stopped")?;
    Ok(())
}

/// Resolves the final connection configuration with precedence:
/// 1. CLI arguments (highest)
/// 2. Named connection from config
/// 3. Default connection from config
/// 4. `DATABASE_URL`
/// 5. `PGHOST` / `PGDATABASE` alone
///
/// `PG*` variables then fill any remaining gaps in a PostgreSQL connection.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    let mut connection = cli.to_connection_config()?;

    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(PortalError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    if connection.is_none() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            connection = Some(ConnectionConfig::from_connection_string(&url)?);
        }
    }

    if connection.is_none()
        && (std::env::var_os("PGHOST").is_some() || std::env::var_os("PGDATABASE").is_some())
    {
        connection = Some(ConnectionConfig {
            port: DatabaseBackend::Postgres.default_port(),
            ..ConnectionConfig::default()
        });
    }

    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
