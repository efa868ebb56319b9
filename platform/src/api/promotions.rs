//! Promotion endpoints.
//!
//! Direct (author-run):
//! - GET  /api/products/:id/direct-promotions
//! - PUT  /api/products/:id/direct-promotions       - save both kinds
//! - POST /api/direct-promotions/:id/start
//! - POST /api/direct-promotions/:id/stop
//! - POST /api/direct-promotions/:id/end
//! - POST /api/direct-promotions/:id/issue-reader-of-prev
//! - GET  /api/direct-promotions/:id/issuance-status
//!
//! Applied (operator-reviewed):
//! - GET  /api/products/:id/applied-promotions      - author's board
//! - POST /api/products/:id/applied-promotions      - apply
//! - GET  /api/applied-promotion-slots              - weekly slots left
//! - POST /api/applied-promotions/:id/cancel        - author
//! - GET  /api/applied-promotions?status=           - operator queue
//! - POST /api/applied-promotions/:id/approve       - operator
//! - POST /api/applied-promotions/:id/deny          - operator
//! - POST /api/applied-promotions/:id/end           - operator

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::promotion::{applied, direct};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use webnovel_core::rules::promotion::{AppliedAction, DirectAction};
use webnovel_core::store::Database;
use webnovel_core::types::{
    AppliedPromotion, AppliedPromotionId, AppliedPromotionStatus, AppliedPromotionType,
    DirectPromotion, DirectPromotionId, ProductId,
};
use webnovel_core::{DateTime, Utc};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Body of a direct promotion save.
#[derive(Debug, Deserialize)]
pub struct SaveDirectRequest {
    /// Tickets each reader receives
    pub num_of_ticket_per_person: i32,
}

/// Body of an applied promotion application.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    /// Promotion type
    #[serde(rename = "type")]
    pub kind: AppliedPromotionType,
    /// Requested start
    pub start_date: DateTime<Utc>,
    /// Requested end
    pub end_date: DateTime<Utc>,
    /// Tickets each reader receives
    #[serde(default = "one")]
    pub num_of_ticket_per_person: i32,
}

const fn one() -> i32 {
    1
}

impl From<ApplyRequest> for applied::Application {
    fn from(body: ApplyRequest) -> Self {
        Self {
            kind: body.kind,
            start_date: body.start_date,
            end_date: body.end_date,
            num_of_ticket_per_person: body.num_of_ticket_per_person,
        }
    }
}

/// Operator queue filter.
#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// Only rows in this status
    #[serde(default)]
    pub status: Option<AppliedPromotionStatus>,
}

/// Weekly slot count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slots {
    /// Applications still accepted this week
    pub remaining: i64,
}

// ----- direct -------------------------------------------------------------

/// Direct promotions on the caller's product.
pub async fn list_direct<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<Vec<DirectPromotion>>> {
    let rows = state.platform.list_direct_promotions(caller.id(), id).await?;
    Ok(ApiResponse::new(rows))
}

/// Create or update both direct promotions.
pub async fn save_direct<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<SaveDirectRequest>,
) -> WebResult<ApiResponse<Vec<DirectPromotion>>> {
    let rows = state
        .platform
        .save_direct_promotions(caller.id(), id, body.num_of_ticket_per_person)
        .await?;
    Ok(ApiResponse::new(rows))
}

async fn transition_direct<D: Database>(
    state: &AppState<D>,
    caller: &AuthUser,
    id: DirectPromotionId,
    action: DirectAction,
) -> WebResult<ApiResponse<DirectPromotion>> {
    let row = state
        .platform
        .transition_direct_promotion(caller.id(), id, action)
        .await?;
    Ok(ApiResponse::new(row))
}

/// Start or resume a direct promotion.
pub async fn start_direct<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<DirectPromotionId>,
) -> WebResult<ApiResponse<DirectPromotion>> {
    transition_direct(&state, &caller, id, DirectAction::Start).await
}

/// Pause a direct promotion.
pub async fn stop_direct<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<DirectPromotionId>,
) -> WebResult<ApiResponse<DirectPromotion>> {
    transition_direct(&state, &caller, id, DirectAction::Stop).await
}

/// Finish a direct promotion.
pub async fn end_direct<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<DirectPromotionId>,
) -> WebResult<ApiResponse<DirectPromotion>> {
    transition_direct(&state, &caller, id, DirectAction::End).await
}

/// Run this week's reader-of-prev issuance.
pub async fn issue_reader_of_prev<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<DirectPromotionId>,
) -> WebResult<ApiResponse<direct::ReaderOfPrevIssuance>> {
    let issued = state.platform.issue_reader_of_prev(caller.id(), id).await?;
    Ok(ApiResponse::new(issued))
}

/// Whether this week's issuance already ran.
pub async fn issuance_status<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<DirectPromotionId>,
) -> WebResult<ApiResponse<direct::IssuanceStatus>> {
    let status = state.platform.issuance_status(caller.id(), id).await?;
    Ok(ApiResponse::new(status))
}

// ----- applied ------------------------------------------------------------

/// The author's applied promotion board.
pub async fn applied_board<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<applied::AppliedPromotionBoard>> {
    let board = state
        .platform
        .applied_promotion_board(caller.id(), id)
        .await?;
    Ok(ApiResponse::new(board))
}

/// Apply for a waiting-for-free or 6-9-path promotion.
pub async fn apply<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<ApplyRequest>,
) -> WebResult<Created<AppliedPromotion>> {
    let row = state
        .platform
        .apply_promotion(caller.id(), id, body.into())
        .await?;
    Ok(ApiResponse::created(row))
}

/// Applications left under this week's cap.
pub async fn remaining_slots<D: Database>(
    State(state): State<AppState<D>>,
    _caller: AuthUser,
) -> WebResult<ApiResponse<Slots>> {
    let remaining = state.platform.remaining_applied_slots().await?;
    Ok(ApiResponse::new(Slots { remaining }))
}

/// Withdraw an application or a running promotion.
pub async fn cancel_applied<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<AppliedPromotionId>,
) -> WebResult<ApiResponse<AppliedPromotion>> {
    let row = state
        .platform
        .cancel_applied_promotion(caller.id(), id)
        .await?;
    Ok(ApiResponse::new(row))
}

/// Operator review queue.
pub async fn queue<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Query(query): Query<QueueQuery>,
) -> WebResult<ApiResponse<Vec<AppliedPromotion>>> {
    let rows = state
        .platform
        .applied_promotion_queue(&caller.user, query.status)
        .await?;
    Ok(ApiResponse::new(rows))
}

async fn decide<D: Database>(
    state: &AppState<D>,
    caller: &AuthUser,
    id: AppliedPromotionId,
    action: AppliedAction,
) -> WebResult<ApiResponse<AppliedPromotion>> {
    let row = state
        .platform
        .decide_applied_promotion(&caller.user, id, action)
        .await?;
    Ok(ApiResponse::new(row))
}

/// Approve an application.
pub async fn approve<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<AppliedPromotionId>,
) -> WebResult<ApiResponse<AppliedPromotion>> {
    decide(&state, &caller, id, AppliedAction::Approve).await
}

/// Refuse an application.
pub async fn deny<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<AppliedPromotionId>,
) -> WebResult<ApiResponse<AppliedPromotion>> {
    decide(&state, &caller, id, AppliedAction::Deny).await
}

/// End a running promotion.
pub async fn end_applied<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<AppliedPromotionId>,
) -> WebResult<ApiResponse<AppliedPromotion>> {
    decide(&state, &caller, id, AppliedAction::End).await
}
