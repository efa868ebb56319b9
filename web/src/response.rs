//! Success envelope.
//!
//! Every successful response body is `{"data": <payload>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"data": …}` wrapper for handler results.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Payload
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data }
    }

    /// Wrap a payload and answer `201 Created`.
    #[must_use]
    pub const fn created(data: T) -> Created<T> {
        Created(Self { data })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Envelope sent with `201 Created`.
#[derive(Debug, Clone)]
pub struct Created<T>(pub ApiResponse<T>);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn payload_is_wrapped_in_data() {
        let response = ApiResponse::new(serde_json::json!({"purchasedCount": 3})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"data": {"purchasedCount": 3}}));
    }

    #[tokio::test]
    async fn created_uses_201() {
        let response = ApiResponse::created("ok").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
