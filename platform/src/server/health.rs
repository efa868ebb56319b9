//! Probe and scrape endpoints.

use super::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use webnovel_core::store::Database;
use webnovel_web::handlers::health::ReadinessResponse;

/// `200` once a database transaction opens and commits, `503` otherwise.
pub async fn readiness_check<D: Database>(
    State(state): State<AppState<D>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    webnovel_web::handlers::readiness(state.platform.ready().await)
}

/// Prometheus text format; `404` when no recorder is installed.
pub async fn metrics<D: Database>(State(state): State<AppState<D>>) -> Response {
    match state.metrics.as_ref().and_then(|m| m.render()) {
        Some(body) => (
            StatusCode::OK,
            [(http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
