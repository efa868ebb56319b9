//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. Client errors (4xx)
//! carry a stable `code` and a message:
//!
//! ```json
//! { "code": "E4044", "message": "The work does not exist." }
//! ```
//!
//! Server errors (5xx) are logged and sent with an empty body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use webnovel_core::store::StoreError;
use webnovel_core::{ErrorCode, PlatformError};

/// Application error type for web handlers.
///
/// Build one from a [`PlatformError`] or an [`ErrorCode`] with `?`; the
/// conversion picks the status and wire code.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> WebResult<ApiResponse<View>> {
///     let view = state.platform.product_view(id, None).await?;
///     Ok(ApiResponse::new(view))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the user-facing message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Error for a business code with its default message.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(
            status_of(code.status()),
            code.message().to_string(),
            code.as_str().to_string(),
        )
    }

    /// Create a 400 Bad Request error with the generic input code.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::InvalidInput).with_message(message)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Wire code of this error.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
            return self.status.into_response();
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Business { code, message } => Self::from_code(code).with_message(message),
            PlatformError::InsufficientFunds { .. } => Self::from_code(ErrorCode::InsufficientCash),
            PlatformError::ServiceUnavailable(reason) => {
                Self::unavailable("A dependency is unavailable")
                    .with_source(anyhow::anyhow!(reason))
            }
            PlatformError::Store(store) => Self::from(store),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // Lost serialization races and constraint races are retryable.
            StoreError::Unavailable(_) | StoreError::Conflict(_) => {
                Self::unavailable("The database is busy").with_source(err.into())
            }
            StoreError::Database(_) => {
                Self::internal("An internal error occurred").with_source(err.into())
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, Vec<u8>) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[E4001] Invalid input");
    }

    #[test]
    fn business_codes_keep_their_status() {
        let err = AppError::from(ErrorCode::ProductNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "E4044");

        let err = AppError::from(ErrorCode::InvalidProductField);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn insufficient_funds_is_a_client_error() {
        let err = AppError::from(PlatformError::InsufficientFunds {
            balance: 10,
            required: 100,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "E4002");
    }

    #[test]
    fn transient_failures_are_unavailable() {
        let err = AppError::from(PlatformError::ServiceUnavailable("idp down".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::from(PlatformError::Store(StoreError::Unavailable("40001".into())));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::from(StoreError::Database("syntax".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn client_errors_carry_code_and_message() {
        let (status, body) = body_of(PlatformError::with_message(
            ErrorCode::InvalidContractOfferProfitRate,
            "rates add up to 110",
        )
        .into())
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INVALID_CONTRACT_OFFER_PROFIT_RATE");
        assert_eq!(json["message"], "rates add up to 110");
    }

    #[tokio::test]
    async fn server_errors_have_empty_body() {
        let (status, body) = body_of(AppError::internal("boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }
}
