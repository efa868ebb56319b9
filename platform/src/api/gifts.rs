//! Gift box endpoints.
//!
//! - GET  /api/giftbook                       - claimable gifts
//! - POST /api/giftbook/receive/:id           - claim into tickets
//! - GET  /api/giftbook/transactions?type=    - gift audit trail

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::giftbox;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{GiftId, GiftItem, GiftTransaction, GiftTransactionType};
use webnovel_web::{ApiResponse, WebResult};

/// Transaction filter.
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Only `received` or `used`
    #[serde(default, rename = "type")]
    pub kind: Option<GiftTransactionType>,
}

/// Unexpired, unclaimed gifts.
pub async fn list<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<GiftItem>>> {
    let gifts = state.platform.list_gifts(caller.id()).await?;
    Ok(ApiResponse::new(gifts))
}

/// Claim a gift.
pub async fn receive<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<GiftId>,
) -> WebResult<ApiResponse<giftbox::GiftReceipt>> {
    let receipt = state.platform.receive_gift(caller.id(), id).await?;
    Ok(ApiResponse::new(receipt))
}

/// Received and used gift history.
pub async fn transactions<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Query(query): Query<TransactionQuery>,
) -> WebResult<ApiResponse<Vec<GiftTransaction>>> {
    let rows = state
        .platform
        .gift_transactions(caller.id(), query.kind)
        .await?;
    Ok(ApiResponse::new(rows))
}
