//! Page statements against PostgreSQL.
//!
//! Each test builds its tables in a throwaway schema reached through the
//! connection's `search_path`. Skipped unless DATABASE_URL is set.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use grad_portal::config::ConnectionConfig;
use grad_portal::db::{SqlxConnector, Timeouts};
use grad_portal::form::FormFields;
use grad_portal::handler::{FormQueryHandler, HandlerSettings};
use grad_portal::pages::{ADVANCED_SEARCH, BASIC_SEARCH, BROWSE, INSERT};
use pretty_assertions::assert_eq;
use sqlx::{Connection, Executor, PgConnection};

use super::common::column;

struct PgSchema {
    url: String,
    name: String,
}

impl PgSchema {
    async fn create() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let name = format!("grad_portal_test_{}_{nanos}", std::process::id());

        let mut conn = PgConnection::connect(&url).await.unwrap();
        conn.execute(
            format!(
                "CREATE SCHEMA {name};
                 CREATE TABLE {name}.university (
                     univ_id INTEGER PRIMARY KEY,
                     email_domain VARCHAR(64),
                     univ_name VARCHAR(128),
                     admit_season VARCHAR(16));
                 CREATE TABLE {name}.student (
                     username VARCHAR(32) PRIMARY KEY,
                     email_id VARCHAR(64),
                     name VARCHAR(64),
                     undergrad_gpa NUMERIC(3, 2),
                     toefl_score INTEGER,
                     gre_score INTEGER,
                     work_experience INTEGER,
                     app_term VARCHAR(16));
                 CREATE TABLE {name}.studying_in (
                     username VARCHAR(32),
                     univ_id INTEGER);
                 INSERT INTO {name}.university VALUES
                     (1, 'wisc.edu', 'University of Wisconsin', 'Fall2012'),
                     (2, 'purdue.edu', 'Purdue University', 'Spring2013');
                 INSERT INTO {name}.student VALUES
                     ('alice', 'alice@wisc.edu', 'Alice', 3.80, 105, 325, 3, 'Fall2012'),
                     ('bob', 'bob@purdue.edu', 'Bob', 3.20, 95, 310, 1, 'Fall2012');
                 INSERT INTO {name}.studying_in VALUES ('alice', 1), ('bob', 2);"
            )
            .as_str(),
        )
        .await
        .unwrap();
        conn.close().await.unwrap();

        Some(Self { url, name })
    }

    fn handler(&self) -> FormQueryHandler {
        let mut config = ConnectionConfig::from_connection_string(&self.url).unwrap();
        config.schema = Some(self.name.clone());
        FormQueryHandler::new(
            Arc::new(SqlxConnector::new(config, Timeouts::default())),
            HandlerSettings::default(),
        )
    }

    async fn remove(self) {
        let mut conn = PgConnection::connect(&self.url).await.unwrap();
        conn.execute(format!("DROP SCHEMA {} CASCADE", self.name).as_str())
            .await
            .unwrap();
        conn.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_pages_against_postgres() {
    let Some(schema) = PgSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let handler = schema.handler();

    let fields = FormFields::new().with("admit_season", "Fall2012");
    let result = handler.run(&BASIC_SEARCH, &fields).await.unwrap();
    assert_eq!(column(&result, "univ_name"), vec!["University of Wisconsin"]);

    let result = handler.run(&BROWSE, &FormFields::new()).await.unwrap();
    assert_eq!(column(&result, "gre_score"), vec!["325", "310"]);
    assert_eq!(column(&result, "undergrad_gpa"), vec!["3.8", "3.2"]);

    let fields = FormFields::new()
        .with("undergrad_gpa", "3.5")
        .with("gre_score", "320")
        .with("toefl_score", "100")
        .with("work_exp", "2");
    let result = handler.run(&ADVANCED_SEARCH, &fields).await.unwrap();
    assert_eq!(column(&result, "univ_name"), vec!["University of Wisconsin"]);

    let fields = FormFields::new()
        .with("username", "bucky")
        .with("undergrad_gpa", "3.9")
        .with("gre_score", "330")
        .with("toefl_score", "112")
        .with("work_exp", "1")
        .with("app_term", "Fall2012");
    let result = handler.run(&INSERT, &fields).await.unwrap();
    assert_eq!(result.rows_affected, 1);

    let error = handler.run(&INSERT, &fields).await.unwrap_err();
    assert!(error.is_backend());

    schema.remove().await;
}

#[tokio::test]
async fn test_hostile_text_is_bound_as_data() {
    let Some(schema) = PgSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let handler = schema.handler();

    let fields = FormFields::new().with("admit_season", "x'; DROP TABLE student; --");
    let result = handler.run(&BASIC_SEARCH, &fields).await.unwrap();
    assert!(result.is_empty());

    let result = handler.run(&BROWSE, &FormFields::new()).await.unwrap();
    assert_eq!(result.row_count, 2);

    schema.remove().await;
}
