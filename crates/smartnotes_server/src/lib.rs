//! HTTP surface for the SmartNotes service.
//!
//! # Responsibility
//! - Map the notes REST API onto `smartnotes_core` use-cases.
//! - Own request logging, CORS, error bodies and configuration.
//!
//! # Invariants
//! - No note rule is decided here; handlers only translate.

pub mod config;
pub mod error;
pub mod payload;
pub mod routes;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use routes::SharedState;
use std::time::Instant;
use tower_http::cors::CorsLayer;

pub use config::{ConfigError, ServerConfig};
pub use routes::AppState;

/// Builds the full application router around a shared state.
pub fn build_router(state: SharedState) -> Router {
    let notes = Router::new()
        .route("/", get(routes::list_notes).post(routes::create_note))
        .route("/search", post(routes::search_notes))
        .route("/sync", post(routes::sync_notes))
        .route(
            "/:id",
            get(routes::get_note)
                .put(routes::update_note)
                .delete(routes::delete_note),
        );

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .nest("/api/notes", notes)
        .fallback(routes::route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=http method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
