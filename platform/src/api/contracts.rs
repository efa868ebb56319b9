//! Contract offer endpoints.
//!
//! Offers are created from the product (`POST /api/products/:id/contract-offer`).
//!
//! - GET  /api/me/contract-offers/received
//! - GET  /api/me/contract-offers/sent
//! - POST /api/contract-offers/:id/accept   - author
//! - POST /api/contract-offers/:id/reject   - author

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::contract;
use axum::extract::{Path, State};
use webnovel_core::store::Database;
use webnovel_core::types::{ContractOffer, ContractOfferId};
use webnovel_web::{ApiResponse, WebResult};

/// Offers on the caller's products.
pub async fn received<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<ContractOffer>>> {
    let offers = state.platform.received_contract_offers(caller.id()).await?;
    Ok(ApiResponse::new(offers))
}

/// Offers the caller made, with each product's running promotions.
pub async fn sent<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<contract::SentOffer>>> {
    let offers = state.platform.sent_contract_offers(caller.id()).await?;
    Ok(ApiResponse::new(offers))
}

/// Accept a pending offer.
pub async fn accept<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ContractOfferId>,
) -> WebResult<ApiResponse<ContractOffer>> {
    let offer = state.platform.accept_contract_offer(caller.id(), id).await?;
    Ok(ApiResponse::new(offer))
}

/// Reject a pending offer.
pub async fn reject<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ContractOfferId>,
) -> WebResult<ApiResponse<ContractOffer>> {
    let offer = state.platform.reject_contract_offer(caller.id(), id).await?;
    Ok(ApiResponse::new(offer))
}
