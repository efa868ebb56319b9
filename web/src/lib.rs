//! Axum integration shared by the web-novel platform services.
//!
//! Handlers stay thin: they extract the request, call a service, and map the
//! outcome onto the wire contract.
//!
//! - Success: `200`/`201` with `{"data": …}` ([`ApiResponse`], [`Created`])
//! - Business failure: `4xx` with `{"code": "E4xxx", "message": "…"}` ([`AppError`])
//! - Infrastructure failure: `5xx` with an empty body, logged server-side
//!
//! # Example
//!
//! ```ignore
//! use webnovel_web::{ApiResponse, JsonBody, WebResult};
//!
//! async fn purchase(
//!     user: VerifiedUser,
//!     JsonBody(body): JsonBody<PurchaseRequest>,
//! ) -> WebResult<ApiResponse<PurchaseReceipt>> {
//!     let receipt = platform.purchase_episodes(user.id, body.into()).await?;
//!     Ok(ApiResponse::new(receipt))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;

pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId, JsonBody};
pub use middleware::{
    CORRELATION_ID_HEADER, CorrelationIdExt, tag_correlation_id, track_http_metrics,
};
pub use response::{ApiResponse, Created};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
