//! HTML rendering for page responses.
//!
//! Every document ends with a link back to the entry page. All submitted or
//! stored text is escaped before it is written into markup.

use crate::db::QueryResult;
use crate::form::FieldKind;
use crate::pages::{Output, OutputColumn, PageDef, PAGES};

/// Where the "Back to main page" link points.
pub const MAIN_PAGE: &str = "/";

/// Shown instead of backend detail when detail is hidden.
pub const GENERIC_QUERY_ERROR: &str = "the database could not complete the request";

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn back_link() -> String {
    format!("<a href=\"{MAIN_PAGE}\">Back to main page</a>\n")
}

/// Wraps a body fragment in a complete document ending with the back link.
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<html>\n<head><title>{}</title></head>\n<body>\n{}{}</body>\n</html>\n",
        html_escape(title),
        body,
        back_link()
    )
}

/// Renders a read page's result table.
///
/// Cells follow the page's declared column order; a declared column absent
/// from the result renders empty.
pub fn results_table(caption: &str, columns: &[OutputColumn], result: &QueryResult) -> String {
    let header: String = columns
        .iter()
        .map(|col| format!("<th>{}</th>", html_escape(col.header)))
        .collect();

    let positions: Vec<Option<usize>> = columns
        .iter()
        .map(|col| result.column_index(col.column))
        .collect();

    let body: String = result
        .rows
        .iter()
        .map(|row| {
            let cells: String = positions
                .iter()
                .map(|pos| {
                    let text = pos
                        .and_then(|i| row.get(i))
                        .map(|value| value.to_display_string())
                        .unwrap_or_default();
                    format!("<td>{}</td>", html_escape(&text))
                })
                .collect();
            format!("<tr>{cells}</tr>\n")
        })
        .collect();

    let mut html = format!(
        "<p>{}</p>\n<table border=\"1\">\n<tr>{}</tr>\n{}</table>\n",
        html_escape(caption),
        header,
        body
    );

    if let Some(warning) = result.truncation_warning() {
        html.push_str(&format!("<p><i>{}</i></p>\n", html_escape(&warning)));
    }

    html
}

/// Renders the insert confirmation line.
pub fn confirmation(username: &str) -> String {
    format!(
        "<p>Successfully inserted entry for user: {}</p>\n",
        html_escape(username)
    )
}

/// Renders a successful page response.
pub fn success(page: &PageDef, result: &QueryResult, confirmed_value: &str) -> String {
    let body = match page.output {
        Output::Table { caption, columns } => results_table(caption, columns, result),
        Output::Confirmation { .. } => confirmation(confirmed_value),
    };
    document(page.title, &body)
}

/// Renders a validation failure. The database is never consulted.
pub fn validation_error(page: &PageDef, detail: &str) -> String {
    let body = format!(
        "<h3><i>Error, required parameters not set to an acceptable value</i></h3>\n<p>{}</p>\n",
        html_escape(detail)
    );
    document(page.title, &body)
}

/// Renders a backend failure, with or without the backend's detail.
pub fn query_error(page: &PageDef, detail: Option<&str>) -> String {
    let body = format!(
        "<p>Error with query:</p>\n<pre>{}</pre>\n",
        html_escape(detail.unwrap_or(GENERIC_QUERY_ERROR))
    );
    document(page.title, &body)
}

/// Renders the entry page: one form per page.
pub fn index() -> String {
    let forms: String = PAGES
        .iter()
        .map(|page| {
            let method = if page.allow_get && page.required.is_empty() {
                "get"
            } else {
                "post"
            };
            let inputs: String = page
                .fields()
                .map(|field| {
                    let required = if page.required.iter().any(|f| f.name == field.name) {
                        " required"
                    } else {
                        ""
                    };
                    let step = if field.kind == FieldKind::Float {
                        " step=\"any\""
                    } else {
                        ""
                    };
                    format!(
                        "<label>{} <input type=\"{}\" name=\"{}\"{}{}></label><br>\n",
                        html_escape(field.label),
                        field.kind.input_type(),
                        field.name,
                        step,
                        required
                    )
                })
                .collect();
            format!(
                "<h2>{}</h2>\n<form method=\"{}\" action=\"{}\">\n{}<input type=\"submit\" value=\"{}\">\n</form>\n",
                html_escape(page.title),
                method,
                page.route,
                inputs,
                html_escape(page.title)
            )
        })
        .collect();

    format!(
        "<html>\n<head><title>Graduate Admissions</title></head>\n<body>\n{forms}</body>\n</html>\n"
    )
}
