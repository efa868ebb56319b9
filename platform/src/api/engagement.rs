//! Comment and review endpoints.
//!
//! Comments:
//! - PUT    /api/comments/:id/reaction/:kind
//! - PUT    /api/comments/:id/pin      - author only
//! - PUT    /api/comments/:id/block
//! - POST   /api/comments/:id/report
//! - DELETE /api/comments/:id
//!
//! Reviews:
//! - GET    /api/products/:id/reviews
//! - POST   /api/products/:id/reviews
//! - PUT    /api/reviews/:id/reaction/:kind
//! - PUT    /api/reviews/:id/pin       - author only
//! - PUT    /api/reviews/:id/block
//! - POST   /api/reviews/:id/report
//! - DELETE /api/reviews/:id

#![allow(clippy::missing_errors_doc)]

use super::{AuthUser, MaybeUser};
use crate::server::AppState;
use crate::services::engagement::{BlockState, PinState, ReactionState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{
    CommentId, ContentRef, ProductId, ProfileId, ReactionKind, Report, Review, ReviewId,
};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Body of a report.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// Why the content is reported
    pub reason: String,
}

/// Body of a new review.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// Review text
    pub content: String,
    /// Writing profile; the default profile when absent
    #[serde(default)]
    pub profile_id: Option<ProfileId>,
}

async fn react<D: Database>(
    state: &AppState<D>,
    caller: &AuthUser,
    target: ContentRef,
    kind: ReactionKind,
) -> WebResult<ApiResponse<ReactionState>> {
    let reaction = state.platform.react(caller.id(), target, kind).await?;
    Ok(ApiResponse::new(reaction))
}

async fn pin<D: Database>(
    state: &AppState<D>,
    caller: &AuthUser,
    target: ContentRef,
) -> WebResult<ApiResponse<PinState>> {
    let pin = state.platform.toggle_pin(caller.id(), target).await?;
    Ok(ApiResponse::new(pin))
}

async fn block<D: Database>(
    state: &AppState<D>,
    caller: &AuthUser,
    target: ContentRef,
) -> WebResult<ApiResponse<BlockState>> {
    let block = state.platform.toggle_block(caller.id(), target).await?;
    Ok(ApiResponse::new(block))
}

async fn report<D: Database>(
    state: &AppState<D>,
    caller: &AuthUser,
    target: ContentRef,
    reason: &str,
) -> WebResult<Created<Report>> {
    let report = state.platform.report(caller.id(), target, reason).await?;
    Ok(ApiResponse::created(report))
}

// ----- comments -----------------------------------------------------------

/// Toggle a reaction on a comment.
pub async fn react_comment<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path((id, kind)): Path<(CommentId, ReactionKind)>,
) -> WebResult<ApiResponse<ReactionState>> {
    react(&state, &caller, ContentRef::Comment(id), kind).await
}

/// Pin or unpin a comment on the caller's product.
pub async fn pin_comment<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<CommentId>,
) -> WebResult<ApiResponse<PinState>> {
    pin(&state, &caller, ContentRef::Comment(id)).await
}

/// Hide or show a comment for the caller.
pub async fn block_comment<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<CommentId>,
) -> WebResult<ApiResponse<BlockState>> {
    block(&state, &caller, ContentRef::Comment(id)).await
}

/// Report a comment.
pub async fn report_comment<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<CommentId>,
    JsonBody(body): JsonBody<ReportRequest>,
) -> WebResult<Created<Report>> {
    report(&state, &caller, ContentRef::Comment(id), &body.reason).await
}

/// Delete the caller's comment.
pub async fn delete_comment<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<CommentId>,
) -> WebResult<StatusCode> {
    state.platform.delete_comment(caller.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----- reviews ------------------------------------------------------------

/// Reviews visible to the caller, pinned first.
pub async fn reviews<D: Database>(
    State(state): State<AppState<D>>,
    caller: MaybeUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<Vec<Review>>> {
    let reviews = state.platform.list_reviews(caller.id(), id).await?;
    Ok(ApiResponse::new(reviews))
}

/// Write a review.
pub async fn create_review<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<ReviewRequest>,
) -> WebResult<Created<Review>> {
    let review = state
        .platform
        .create_review(caller.id(), body.profile_id, id, &body.content)
        .await?;
    Ok(ApiResponse::created(review))
}

/// Toggle a reaction on a review.
pub async fn react_review<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path((id, kind)): Path<(ReviewId, ReactionKind)>,
) -> WebResult<ApiResponse<ReactionState>> {
    react(&state, &caller, ContentRef::Review(id), kind).await
}

/// Pin or unpin a review on the caller's product.
pub async fn pin_review<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ReviewId>,
) -> WebResult<ApiResponse<PinState>> {
    pin(&state, &caller, ContentRef::Review(id)).await
}

/// Hide or show a review for the caller.
pub async fn block_review<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ReviewId>,
) -> WebResult<ApiResponse<BlockState>> {
    block(&state, &caller, ContentRef::Review(id)).await
}

/// Report a review.
pub async fn report_review<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ReviewId>,
    JsonBody(body): JsonBody<ReportRequest>,
) -> WebResult<Created<Report>> {
    report(&state, &caller, ContentRef::Review(id), &body.reason).await
}

/// Delete the caller's review.
pub async fn delete_review<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ReviewId>,
) -> WebResult<StatusCode> {
    state.platform.delete_review(caller.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
