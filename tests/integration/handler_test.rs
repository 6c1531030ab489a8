//! Full request handling: validation, execution and rendering.

use std::sync::Arc;
use std::time::Duration;

use grad_portal::config::ConnectionConfig;
use grad_portal::db::{DatabaseBackend, MockConnector, QueryResult, SqlxConnector, Timeouts};
use grad_portal::error::PortalError;
use grad_portal::form::FormFields;
use grad_portal::handler::{FormQueryHandler, HandlerSettings};
use grad_portal::pages::{BASIC_SEARCH, BROWSE, INSERT, PAGES};
use sqlx::{Connection, Executor, SqliteConnection};

use super::common::Fixture;

#[tokio::test]
async fn test_every_page_rejects_empty_submission_before_connecting() {
    for page in PAGES.iter().filter(|p| !p.required.is_empty()) {
        let connector = MockConnector::returning(QueryResult::new());
        let handler = FormQueryHandler::new(Arc::new(connector.clone()), HandlerSettings::default());

        let rendered = handler.handle(page, &FormFields::new()).await;

        assert!(rendered
            .html
            .contains("Error, required parameters not set to an acceptable value"));
        assert_eq!(connector.connect_count(), 0, "{}", page.name);
    }
}

#[tokio::test]
async fn test_browse_renders_rows_in_order() {
    let fixture = Fixture::seeded().await;

    let rendered = fixture.handler().handle(&BROWSE, &FormFields::new()).await;

    assert!(rendered.error.is_none());
    assert_eq!(rendered.html.matches("<tr>").count(), 6);
    let first = rendered.html.find("<td>338</td>").unwrap();
    let last = rendered.html.find("<td>300</td>").unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn test_missing_table_renders_query_error() {
    let fixture = Fixture::empty();

    let rendered = fixture.handler().handle(&BROWSE, &FormFields::new()).await;

    assert!(matches!(rendered.error, Some(PortalError::Query(_))));
    assert!(rendered.html.contains("Error with query:"));
    assert!(rendered.html.contains("no such table"));
    assert!(!rendered.html.contains("<td>"));
}

#[tokio::test]
async fn test_missing_database_file_renders_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConnectionConfig {
        backend: DatabaseBackend::Sqlite,
        database: Some(dir.path().join("absent.db").to_string_lossy().into_owned()),
        ..Default::default()
    };
    let handler = FormQueryHandler::new(
        Arc::new(SqlxConnector::new(config, Timeouts::default())),
        HandlerSettings::default(),
    );

    let fields = FormFields::new().with("admit_season", "Fall2012");
    let rendered = handler.handle(&BASIC_SEARCH, &fields).await;

    assert!(matches!(rendered.error, Some(PortalError::Connection(_))));
    assert!(rendered.html.contains("Error with query:"));
    assert!(!dir.path().join("absent.db").exists());
}

#[tokio::test]
async fn test_insert_confirmation_escapes_username() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new()
        .with("username", "<b>bucky</b>")
        .with("undergrad_gpa", "3.1")
        .with("gre_score", "310")
        .with("toefl_score", "100")
        .with("work_exp", "2")
        .with("app_term", "Spring2013");

    let rendered = fixture.handler().handle(&INSERT, &fields).await;

    assert!(rendered.error.is_none());
    assert!(rendered
        .html
        .contains("Successfully inserted entry for user: &lt;b&gt;bucky&lt;/b&gt;"));
    assert!(!rendered.html.contains("<b>bucky</b>"));
}

#[tokio::test]
async fn test_hidden_detail_on_real_backend() {
    let fixture = Fixture::empty();
    let handler = FormQueryHandler::new(
        fixture.connector(),
        HandlerSettings {
            show_error_detail: false,
            ..HandlerSettings::default()
        },
    );

    let rendered = handler.handle(&BROWSE, &FormFields::new()).await;

    assert!(rendered.error.is_some());
    assert!(!rendered.html.contains("no such table"));
}

#[tokio::test]
async fn test_insert_times_out_while_database_is_locked() {
    let fixture = Fixture::seeded().await;

    let mut holder = SqliteConnection::connect(&format!("sqlite:{}", fixture.path()))
        .await
        .unwrap();
    holder.execute("BEGIN EXCLUSIVE").await.unwrap();

    let handler = FormQueryHandler::new(
        fixture.connector_with(Timeouts {
            connect: Duration::from_secs(1),
            query: Duration::from_secs(1),
        }),
        HandlerSettings::default(),
    );
    let fields = FormFields::new()
        .with("username", "bucky")
        .with("undergrad_gpa", "3.9")
        .with("gre_score", "325")
        .with("toefl_score", "112")
        .with("work_exp", "1")
        .with("app_term", "Fall2012");

    let rendered = tokio::time::timeout(Duration::from_secs(10), handler.handle(&INSERT, &fields))
        .await
        .expect("request did not finish");

    let error = rendered.error.expect("insert should fail while locked");
    assert!(matches!(error, PortalError::Query(_)), "{error}");
    let message = error.to_string();
    assert!(
        message.contains("timed out") || message.contains("locked"),
        "{message}"
    );
    assert!(rendered.html.contains("Error with query:"));

    holder.execute("ROLLBACK").await.unwrap();
    holder.close().await.unwrap();
    assert_eq!(fixture.student_count().await, 5);
}
