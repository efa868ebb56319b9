//! Caller account endpoints.
//!
//! - GET    /api/me                          - dashboard summary
//! - GET    /api/me/profiles
//! - POST   /api/me/profiles
//! - PUT    /api/me/profiles/:id/default
//! - PUT    /api/me/profiles/:id/nickname
//! - POST   /api/me/identity                 - phone verification
//! - DELETE /api/me                          - withdraw
//! - GET    /api/me/bookmarks
//! - GET    /api/me/recent
//! - DELETE /api/me/recent/:product_id
//! - PUT    /api/admin/users/:id/role        - admin

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::composer;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{Bookmark, ProductId, Profile, ProfileId, Recent, Role, User, UserId};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Body carrying a nickname.
#[derive(Debug, Deserialize)]
pub struct NicknameRequest {
    /// Requested nickname
    pub nickname: String,
}

/// Body of a phone verification.
#[derive(Debug, Deserialize)]
pub struct IdentityRequest {
    /// Verified phone number
    pub phone: String,
}

/// Body of a role grant.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    /// Role to assign
    pub role: Role,
}

/// Balance, ticket, gift and notification counts.
pub async fn summary<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<composer::MySummary>> {
    let summary = state.platform.my_summary(caller.id()).await?;
    Ok(ApiResponse::new(summary))
}

/// Caller's profiles.
pub async fn profiles<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<Profile>>> {
    let profiles = state.platform.list_profiles(caller.id()).await?;
    Ok(ApiResponse::new(profiles))
}

/// Add a profile.
pub async fn create_profile<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    JsonBody(body): JsonBody<NicknameRequest>,
) -> WebResult<Created<Profile>> {
    let profile = state
        .platform
        .create_profile(caller.id(), &body.nickname)
        .await?;
    Ok(ApiResponse::created(profile))
}

/// Make a profile the default.
pub async fn set_default_profile<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProfileId>,
) -> WebResult<ApiResponse<Profile>> {
    let profile = state.platform.set_default_profile(caller.id(), id).await?;
    Ok(ApiResponse::new(profile))
}

/// Rename a profile; renames past the free allowance are rejected.
pub async fn change_nickname<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProfileId>,
    JsonBody(body): JsonBody<NicknameRequest>,
) -> WebResult<ApiResponse<Profile>> {
    let profile = state
        .platform
        .change_nickname(caller.id(), id, &body.nickname)
        .await?;
    Ok(ApiResponse::new(profile))
}

/// Record a completed phone verification.
pub async fn verify_identity<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    JsonBody(body): JsonBody<IdentityRequest>,
) -> WebResult<ApiResponse<User>> {
    let user = state
        .platform
        .verify_identity(caller.id(), &body.phone)
        .await?;
    Ok(ApiResponse::new(user))
}

/// Close the caller's account.
pub async fn withdraw<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<User>> {
    let user = state.platform.withdraw(caller.id()).await?;
    Ok(ApiResponse::new(user))
}

/// Active bookmarks.
pub async fn bookmarks<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<Bookmark>>> {
    let rows = state.platform.list_bookmarks(caller.id()).await?;
    Ok(ApiResponse::new(rows))
}

/// Recently read products.
pub async fn recent<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<Recent>>> {
    let rows = state.platform.list_recent(caller.id()).await?;
    Ok(ApiResponse::new(rows))
}

/// Drop a product from the recently-read list.
pub async fn delete_recent<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(product): Path<ProductId>,
) -> WebResult<StatusCode> {
    state.platform.delete_recent(caller.id(), product).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign a role. Admin only.
pub async fn grant_role<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(target): Path<UserId>,
    JsonBody(body): JsonBody<RoleRequest>,
) -> WebResult<ApiResponse<User>> {
    let user = state
        .platform
        .grant_role(&caller.user, target, body.role)
        .await?;
    Ok(ApiResponse::new(user))
}
