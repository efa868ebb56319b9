//! Cash and ticket endpoints.
//!
//! - GET  /api/cash          - balance
//! - GET  /api/cash/history  - ledger rows, newest first
//! - GET  /api/tickets       - productbook
//! - POST /api/admin/cash    - credit a user (admin)

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::ledger;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use webnovel_core::store::Database;
use webnovel_core::types::{CashTransaction, Ticket, UserId};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Current balance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Caller
    pub user_id: UserId,
    /// Cash on hand
    pub balance: i64,
}

/// Body of an administrative credit.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    /// User to credit
    pub user_id: UserId,
    /// Positive amount
    pub amount: i64,
}

/// Caller's balance.
pub async fn balance<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Balance>> {
    let balance = state.platform.balance(caller.id()).await?;
    Ok(ApiResponse::new(Balance {
        user_id: caller.id(),
        balance,
    }))
}

/// Caller's ledger.
pub async fn history<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<CashTransaction>>> {
    let rows = state.platform.cash_history(caller.id()).await?;
    Ok(ApiResponse::new(rows))
}

/// Caller's tickets.
pub async fn tickets<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<Ticket>>> {
    let tickets = state.platform.list_tickets(caller.id()).await?;
    Ok(ApiResponse::new(tickets))
}

/// Credit cash to any user. Admin only.
pub async fn grant<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    JsonBody(body): JsonBody<GrantRequest>,
) -> WebResult<Created<ledger::Movement>> {
    let movement = state
        .platform
        .grant_cash(&caller.user, body.user_id, body.amount)
        .await?;
    Ok(ApiResponse::created(movement))
}
