//! Caller extractors.
//!
//! - [`AuthUser`]: a bearer token the identity provider accepts, mapped onto
//!   a platform user (`E4011` missing or invalid, `E4010` expired)
//! - [`VerifiedUser`]: additionally identity-verified (`E4012`); required by
//!   every endpoint that moves cash
//! - [`MaybeUser`]: anonymous callers allowed, a present token still checked
//!
//! `POST /auth/refresh` exchanges a refresh token; it needs no caller.
//!
//! Resolving the user runs in its own transaction, committed before the
//! handler opens the command's transaction.

use crate::identity::{Claims, TokenPair};
use crate::server::AppState;
use axum::extract::{FromRequestParts, State};
use axum::{async_trait, http::request::Parts};
use http::header::AUTHORIZATION;
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{User, UserId};
use webnovel_core::{ErrorCode, PlatformError};
use webnovel_web::{ApiResponse, AppError, BearerToken, JsonBody, WebResult};

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Platform user
    pub user: User,
    /// Token claims
    pub claims: Claims,
}

impl AuthUser {
    /// Caller's id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    /// Verified at the provider or through the platform's phone check.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.user.identity_verified || self.claims.identity_verified
    }
}

#[async_trait]
impl<D: Database> FromRequestParts<AppState<D>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D>,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let claims = state
            .identity
            .introspect(&token)
            .await
            .map_err(PlatformError::from)?;
        if claims.is_expired(state.platform.now()) {
            return Err(ErrorCode::TokenExpired.into());
        }
        let user = state
            .platform
            .authenticate(&claims.subject, claims.email.as_deref())
            .await?;
        Ok(Self { user, claims })
    }
}

/// Authenticated and identity-verified caller.
#[derive(Debug, Clone)]
pub struct VerifiedUser(pub AuthUser);

impl VerifiedUser {
    /// Caller's id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.0.id()
    }
}

#[async_trait]
impl<D: Database> FromRequestParts<AppState<D>> for VerifiedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D>,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        if !caller.is_verified() {
            tracing::warn!(user_id = %caller.id(), "Identity not verified");
            return Err(ErrorCode::IdentityNotVerified.into());
        }
        Ok(Self(caller))
    }
}

/// Optional caller for public reads.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    /// Caller's id, when authenticated.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(AuthUser::id)
    }
}

#[async_trait]
impl<D: Database> FromRequestParts<AppState<D>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D>,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(Self(None));
        }
        AuthUser::from_request_parts(parts, state)
            .await
            .map(|caller| Self(Some(caller)))
    }
}

/// Body of a token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token issued with the current pair
    pub refresh_token: String,
}

/// Exchange a refresh token at the identity provider.
///
/// # Errors
///
/// `E4011` when the provider rejects the token, `503` when it is unreachable.
pub async fn refresh<D: Database>(
    State(state): State<AppState<D>>,
    JsonBody(body): JsonBody<RefreshRequest>,
) -> WebResult<ApiResponse<TokenPair>> {
    let pair = state
        .identity
        .refresh(&body.refresh_token)
        .await
        .map_err(PlatformError::from)?;
    Ok(ApiResponse::new(pair))
}
