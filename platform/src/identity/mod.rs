//! Bridge to the external identity provider.
//!
//! The platform never issues credentials. A bearer token is introspected at
//! the provider; its `sub` claim maps onto an internal user.
//!
//! - [`OidcIdentityProvider`]: RFC 7662 introspection and the OAuth2 refresh
//!   grant over HTTP, retried with exponential backoff
//! - [`StaticIdentityProvider`]: fixed token table for tests and local runs

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use webnovel_core::{ErrorCode, PlatformError};

mod oidc;
mod fixed;

pub use fixed::StaticIdentityProvider;
pub use oidc::OidcIdentityProvider;

/// Identity-provider failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Token unknown, revoked or malformed.
    #[error("token is not active")]
    InvalidToken,

    /// Token was valid but its lifetime elapsed.
    #[error("token expired")]
    Expired,

    /// Transport failure or 5xx from the provider.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for PlatformError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidToken => Self::business(ErrorCode::TokenInvalid),
            IdentityError::Expired => Self::business(ErrorCode::TokenExpired),
            IdentityError::Unavailable(reason) => Self::ServiceUnavailable(reason),
        }
    }
}

/// Claims of an active access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; stable external user key
    pub subject: String,
    /// Token expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Identity verification passed at the provider
    pub identity_verified: bool,
    /// Email, when the provider shares it
    pub email: Option<String>,
}

impl Claims {
    /// Whether the token's lifetime has elapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Fresh tokens from a refresh grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
}

/// External identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Resolve an access token into claims.
    fn introspect<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Claims, IdentityError>>;

    /// Exchange a refresh token for a new pair.
    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, Result<TokenPair, IdentityError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use webnovel_core::ErrorKind;

    #[test]
    fn identity_errors_map_onto_platform_codes() {
        assert!(PlatformError::from(IdentityError::Expired).is(ErrorCode::TokenExpired));
        assert!(PlatformError::from(IdentityError::InvalidToken).is(ErrorCode::TokenInvalid));
        assert_eq!(
            PlatformError::from(IdentityError::Unavailable("down".into())).kind(),
            ErrorKind::Transient
        );
    }
}
