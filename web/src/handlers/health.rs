//! Health check endpoints.
//!
//! Used by load balancers and orchestrators. Liveness never touches
//! dependencies; readiness reports each dependency the caller probed.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Liveness body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
}

/// Liveness check.
///
/// ```text
/// GET /health
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Readiness body.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// All dependencies answered
    pub ready: bool,
    /// Database connectivity
    pub database: bool,
}

/// Readiness answer for a database probe result.
///
/// `200` when the database answered, `503` otherwise.
#[must_use]
pub fn readiness(database: bool) -> (StatusCode, Json<ReadinessResponse>) {
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadinessResponse {
            ready: database,
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[test]
    fn readiness_follows_database() {
        let (status, Json(body)) = readiness(true);
        assert_eq!(status, StatusCode::OK);
        assert!(body.ready);

        let (status, Json(body)) = readiness(false);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.database);
    }
}
