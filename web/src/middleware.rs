//! Request middleware installed on every route.
//!
//! [`tag_correlation_id`] gives each request a correlation id (the caller's
//! `X-Correlation-ID` when it is a valid UUID, a fresh v4 otherwise), runs the
//! handler inside an `http_request` span carrying it, and echoes it back.
//! [`track_http_metrics`] feeds the request counter and latency histogram.
//!
//! Both are plain `from_fn` middleware:
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn};
//! use webnovel_web::middleware::{tag_correlation_id, track_http_metrics};
//!
//! let app = Router::new()
//!     .route("/api/cash", get(balance))
//!     .layer(from_fn(track_http_metrics))
//!     .layer(from_fn(tag_correlation_id));
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;
use webnovel_runtime::metrics::HttpMetrics;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// The caller's correlation id, if it sent a well-formed one.
pub(crate) fn inbound_correlation_id(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(CORRELATION_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(raw).ok()
}

/// Attach a correlation id to the request, its span and its response.
pub async fn tag_correlation_id(mut req: Request, next: Next) -> Response {
    let id = inbound_correlation_id(req.headers()).unwrap_or_else(Uuid::new_v4);
    req.extensions_mut().insert(id);

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let mut response = next.run(req).instrument(span).await;

    // A hyphenated UUID is always a valid header value
    if let Ok(value) = HeaderValue::from_str(&id.hyphenated().to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

/// Access to the id [`tag_correlation_id`] stored on the request.
pub trait CorrelationIdExt {
    /// `None` when the middleware is not installed.
    fn correlation_id(&self) -> Option<Uuid>;
}

impl CorrelationIdExt for Request {
    fn correlation_id(&self) -> Option<Uuid> {
        self.extensions().get::<Uuid>().copied()
    }
}

/// Record `webnovel_http_requests_total` and the request latency.
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let started = Instant::now();
    let response = next.run(req).await;
    HttpMetrics::record_request(method, response.status().as_u16(), started.elapsed());
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn fresh_id_when_header_missing() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(tag_correlation_id));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present");
        assert!(Uuid::parse_str(correlation_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn caller_id_is_echoed() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(tag_correlation_id));

        let request_uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, request_uuid.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let response_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap();

        assert_eq!(response_id, request_uuid.to_string());
    }

    #[tokio::test]
    async fn correlation_id_reaches_handlers() {
        async fn handler(req: Request<Body>) -> String {
            req.correlation_id().map(|id| id.to_string()).unwrap_or_default()
        }

        let app = Router::new()
            .route("/test", get(handler))
            .layer(from_fn(tag_correlation_id));

        let request_uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, request_uuid.to_string())
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        assert_eq!(body, request_uuid.to_string().as_bytes());
    }

    #[tokio::test]
    async fn malformed_header_is_replaced() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(tag_correlation_id));

        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let echoed = response.headers()[CORRELATION_ID_HEADER].to_str().unwrap();

        assert_ne!(echoed, "not-a-uuid");
        assert!(Uuid::parse_str(echoed).is_ok());
    }

    #[tokio::test]
    async fn metrics_middleware_passes_responses_through() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(track_http_metrics));

        let request = Request::builder().uri("/missing").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), 404);
    }
}
