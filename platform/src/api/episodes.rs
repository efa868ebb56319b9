//! Episode endpoints.
//!
//! - POST /api/episodes/:id/open            - read, consuming a ticket if needed
//! - POST /api/episodes/:id/purchase        - buy one episode (verified)
//! - PUT  /api/episodes/:id/reaction/:kind  - recommend or not
//! - GET  /api/episodes/:id/comments        - comment thread
//! - POST /api/episodes/:id/comments        - write a comment or reply

#![allow(clippy::missing_errors_doc)]

use super::{AuthUser, MaybeUser, VerifiedUser};
use crate::server::AppState;
use crate::services::{library, purchase};
use axum::extract::{Path, State};
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{
    Comment, CommentId, EpisodeId, OwnType, ProfileId, ReactionKind, Ticket,
};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Body of a single-episode purchase.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Profile the ticket is issued to
    pub profile_id: ProfileId,
    /// Rental or own
    pub own_type: OwnType,
}

/// Body of a new comment.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Comment text
    pub content: String,
    /// Comment being replied to
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    /// Writing profile; the default profile when absent
    #[serde(default)]
    pub profile_id: Option<ProfileId>,
}

/// Open an episode.
pub async fn open<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<EpisodeId>,
) -> WebResult<ApiResponse<purchase::EpisodeAccess>> {
    let access = state.platform.open_episode(caller.id(), id).await?;
    Ok(ApiResponse::new(access))
}

/// Buy one episode for cash.
pub async fn purchase<D: Database>(
    State(state): State<AppState<D>>,
    caller: VerifiedUser,
    Path(id): Path<EpisodeId>,
    JsonBody(body): JsonBody<PurchaseRequest>,
) -> WebResult<Created<Ticket>> {
    let ticket = state
        .platform
        .purchase_episode(caller.id(), body.profile_id, id, body.own_type)
        .await?;
    Ok(ApiResponse::created(ticket))
}

/// Toggle a reaction on an episode the caller has read.
pub async fn react<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path((id, kind)): Path<(EpisodeId, ReactionKind)>,
) -> WebResult<ApiResponse<library::EpisodeReaction>> {
    let reaction = state.platform.react_episode(caller.id(), id, kind).await?;
    Ok(ApiResponse::new(reaction))
}

/// Comments visible to the caller, pinned first.
pub async fn comments<D: Database>(
    State(state): State<AppState<D>>,
    caller: MaybeUser,
    Path(id): Path<EpisodeId>,
) -> WebResult<ApiResponse<Vec<Comment>>> {
    let comments = state.platform.list_comments(caller.id(), id).await?;
    Ok(ApiResponse::new(comments))
}

/// Write a comment, or a reply when `parent_id` is set.
pub async fn create_comment<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<EpisodeId>,
    JsonBody(body): JsonBody<CommentRequest>,
) -> WebResult<Created<Comment>> {
    let comment = state
        .platform
        .create_comment(
            caller.id(),
            body.profile_id,
            id,
            body.parent_id,
            &body.content,
        )
        .await?;
    Ok(ApiResponse::created(comment))
}
