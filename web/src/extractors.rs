//! Custom Axum extractors.
//!
//! - `CorrelationId`: Extract or generate request correlation IDs
//! - `BearerToken`: The raw access token from `Authorization: Bearer <token>`
//! - `JsonBody`: JSON body whose rejections use the platform error body
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     correlation_id: CorrelationId,
//!     JsonBody(request): JsonBody<SponsorRequest>,
//! ) -> WebResult<ApiResponse<SponsorReceipt>> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Sponsor");
//!     ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::inbound_correlation_id;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use http::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use webnovel_core::ErrorCode;

/// The request's correlation id.
///
/// Prefers the id chosen by the middleware, then the inbound header, then a
/// fresh UUID.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| inbound_correlation_id(&parts.headers))
            .unwrap_or_else(Uuid::new_v4);
        Ok(Self(id))
    }
}

/// Bearer token extracted from `Authorization: Bearer <token>` header.
///
/// Rejects with `E4011` when the header is missing or malformed.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::from(ErrorCode::TokenInvalid))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::from(ErrorCode::TokenInvalid))?;

        Ok(Self(token.to_string()))
    }
}

/// JSON request body.
///
/// Like [`axum::Json`] but rejects with `E4001` and the platform error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde::Deserialize;

    fn parts_of(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let mut parts = parts_of(Request::builder().header("X-Correlation-ID", uuid.to_string()));
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_generates_new() {
        let mut parts = parts_of(Request::builder());
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_ne!(correlation_id.0, Uuid::nil());
    }

    #[tokio::test]
    async fn bearer_token_is_stripped() {
        let mut parts = parts_of(Request::builder().header(header::AUTHORIZATION, "Bearer abc.def"));
        let token = BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(token.0, "abc.def");
    }

    #[tokio::test]
    async fn missing_or_malformed_bearer_is_token_invalid() {
        for builder in [
            Request::builder(),
            Request::builder().header(header::AUTHORIZATION, "Basic Zm9vOmJhcg=="),
            Request::builder().header(header::AUTHORIZATION, "Bearer "),
        ] {
            let mut parts = parts_of(builder);
            let err = BearerToken::from_request_parts(&mut parts, &())
                .await
                .expect_err("Should reject");
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.code(), "E4011");
        }
    }

    #[derive(Debug, Deserialize)]
    struct PurchaseBody {
        profile_id: i64,
    }

    #[tokio::test]
    async fn json_body_rejection_is_invalid_input() {
        let req = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"profile_id": "x"}"#))
            .expect("Valid request");
        let err = JsonBody::<PurchaseBody>::from_request(req, &())
            .await
            .expect_err("Should reject");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "E4001");

        let req = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"profile_id": 7}"#))
            .expect("Valid request");
        let JsonBody(body) = JsonBody::<PurchaseBody>::from_request(req, &())
            .await
            .expect("Should extract");
        assert_eq!(body.profile_id, 7);
    }
}
