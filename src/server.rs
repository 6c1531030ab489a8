//! HTTP server wiring.
//!
//! Maps each page's route to the shared form-query handler and serves the
//! entry page at `/`.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{PortalError, Result};
use crate::form::FormFields;
use crate::handler::{FormQueryHandler, Rendered};
use crate::pages::{PageDef, PAGES};
use crate::render;

/// Builds the application router.
pub fn router(handler: FormQueryHandler) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/index.html", get(index));

    for page in PAGES.iter().copied() {
        router = router.route(page.route, page_route(page));
    }

    router.with_state(handler)
}

/// Binds `listen` and serves until Ctrl-C.
pub async fn serve(handler: FormQueryHandler, listen: &str) -> Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| PortalError::config(format!("Invalid listen address '{listen}': {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| PortalError::config(format!("Cannot listen on {addr}: {e}")))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PortalError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

async fn index() -> Html<String> {
    Html(render::index())
}

fn page_route(page: &'static PageDef) -> MethodRouter<FormQueryHandler> {
    let serve = move |State(handler): State<FormQueryHandler>,
                      form: Option<Form<HashMap<String, String>>>| async move {
        let fields = form
            .map(|Form(values)| FormFields::from(values))
            .unwrap_or_default();
        into_response(handler.handle(page, &fields).await)
    };

    let route = axum::routing::post(serve);
    if page.allow_get {
        route.get(serve)
    } else {
        route
    }
}

fn into_response(rendered: Rendered) -> Response {
    let status = match &rendered.error {
        None => StatusCode::OK,
        Some(e) if e.is_validation() => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Html(rendered.html)).into_response()
}
