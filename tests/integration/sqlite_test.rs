//! Page statements executed against a real SQLite database.

use grad_portal::db::Value;
use grad_portal::form::FormFields;
use grad_portal::pages::{ADVANCED_SEARCH, BASIC_SEARCH, BROWSE, INSERT};
use pretty_assertions::assert_eq;

use super::common::{column, Fixture};

#[tokio::test]
async fn test_basic_search_matches_season() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new().with("admit_season", "Fall2012");

    let result = fixture.handler().run(&BASIC_SEARCH, &fields).await.unwrap();

    let mut names = column(&result, "univ_name");
    names.sort();
    assert_eq!(names, vec!["University of Michigan", "University of Wisconsin"]);
    assert_eq!(column(&result, "email_domain").len(), 2);
}

#[tokio::test]
async fn test_basic_search_binds_quotes_as_data() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new().with("admit_season", "Fall2012' OR '1'='1");

    let result = fixture.handler().run(&BASIC_SEARCH, &fields).await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_basic_search_survives_drop_table_text() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new().with("admit_season", "x'; DROP TABLE student; --");

    let result = fixture.handler().run(&BASIC_SEARCH, &fields).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(fixture.student_count().await, 5);
}

#[tokio::test]
async fn test_browse_orders_by_gre_descending() {
    let fixture = Fixture::seeded().await;

    let result = fixture
        .handler()
        .run(&BROWSE, &FormFields::new())
        .await
        .unwrap();

    assert_eq!(
        column(&result, "gre_score"),
        vec!["338", "335", "325", "310", "300"]
    );
    assert_eq!(
        column(&result, "univ_name"),
        vec![
            "University of Michigan",
            "Purdue University",
            "University of Wisconsin",
            "Purdue University",
            "University of Wisconsin",
        ]
    );
}

#[tokio::test]
async fn test_advanced_search_applies_windows() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new()
        .with("undergrad_gpa", "3.5")
        .with("gre_score", "320")
        .with("toefl_score", "100")
        .with("work_exp", "2");

    let result = fixture
        .handler()
        .run(&ADVANCED_SEARCH, &fields)
        .await
        .unwrap();

    // erin sits exactly on the upper GRE, TOEFL and work experience bounds.
    assert_eq!(column(&result, "gre_score"), vec!["335", "325"]);
    assert_eq!(column(&result, "undergrad_gpa"), vec!["3.7", "3.8"]);
    assert_eq!(column(&result, "work_experience"), vec!["4", "3"]);
    assert_eq!(
        column(&result, "univ_name"),
        vec!["Purdue University", "University of Wisconsin"]
    );
}

#[tokio::test]
async fn test_advanced_search_gpa_is_strict() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new()
        .with("undergrad_gpa", "3.8")
        .with("gre_score", "320")
        .with("toefl_score", "100")
        .with("work_exp", "2");

    let result = fixture
        .handler()
        .run(&ADVANCED_SEARCH, &fields)
        .await
        .unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_insert_adds_exactly_one_row() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new()
        .with("username", "bucky")
        .with("email_id", "bucky@wisc.edu")
        .with("name", "Bucky Badger")
        .with("undergrad_gpa", "3.9")
        .with("gre_score", "325")
        .with("toefl_score", "112")
        .with("work_exp", "1")
        .with("app_term", "Fall2012");

    let result = fixture.handler().run(&INSERT, &fields).await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(fixture.student_count().await, 6);

    let stored = fixture
        .read(
            "SELECT username, email_id, name, undergrad_gpa, toefl_score, gre_score, \
             work_experience, app_term FROM student WHERE username = $1",
            vec![Value::from("bucky")],
        )
        .await;
    assert_eq!(
        stored.rows,
        vec![vec![
            Value::from("bucky"),
            Value::from("bucky@wisc.edu"),
            Value::from("Bucky Badger"),
            Value::Float(3.9),
            Value::Int(112),
            Value::Int(325),
            Value::Int(1),
            Value::from("Fall2012"),
        ]]
    );
}

#[tokio::test]
async fn test_insert_with_missing_field_leaves_table_unchanged() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new()
        .with("username", "bucky")
        .with("undergrad_gpa", "3.9")
        .with("gre_score", "325")
        .with("toefl_score", "112")
        .with("work_exp", "1");

    let result = fixture.handler().run(&INSERT, &fields).await;

    assert!(result.unwrap_err().is_validation());
    assert_eq!(fixture.student_count().await, 5);
}

#[tokio::test]
async fn test_duplicate_insert_is_a_query_error() {
    let fixture = Fixture::seeded().await;
    let fields = FormFields::new()
        .with("username", "alice")
        .with("undergrad_gpa", "3.0")
        .with("gre_score", "300")
        .with("toefl_score", "90")
        .with("work_exp", "0")
        .with("app_term", "Fall2012");

    let error = fixture.handler().run(&INSERT, &fields).await.unwrap_err();

    assert!(error.is_backend());
    assert!(error.to_string().contains("UNIQUE"));
    assert_eq!(fixture.student_count().await, 5);
}
