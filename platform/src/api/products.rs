//! Product endpoints.
//!
//! - GET  /api/products/:id                       - product page
//! - GET  /api/products/:id/episodes              - episode list
//! - PUT  /api/products/:id/bookmark              - toggle bookmark
//! - GET  /api/products/:id/interest              - interest window
//! - PUT  /api/products/:id/interest/revive       - restart the window
//! - POST /api/products/:id/purchase-all-episodes - bulk buy (verified)
//! - POST /api/products/:id/sponsor               - donate cash (verified)
//! - POST /api/products/:id/contract-offer        - offer a contract
//! - POST /api/products/:id/free-for-first        - claim a first-visit gift
//! - POST /api/products/:id/waiting-for-free      - claim a recharging gift
//! - POST /api/products/:id/six-nine-path         - claim an evening gift

#![allow(clippy::missing_errors_doc)]

use super::{AuthUser, MaybeUser, VerifiedUser};
use crate::server::AppState;
use crate::services::{composer, contract, library, purchase};
use axum::extract::{Path, State};
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{ContractOffer, GiftItem, ProductId, ProfileId};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Body of the bulk purchase.
#[derive(Debug, Deserialize)]
pub struct PurchaseAllRequest {
    /// Profile the tickets are issued to
    pub profile_id: ProfileId,
}

/// Body of a sponsorship.
#[derive(Debug, Deserialize)]
pub struct SponsorRequest {
    /// Sponsoring profile
    pub profile_id: ProfileId,
    /// Cash to donate
    pub donation_price: i64,
    /// Message to the author
    #[serde(default)]
    pub message: Option<String>,
}

/// Product page, with viewer-specific fields when authenticated.
pub async fn view<D: Database>(
    State(state): State<AppState<D>>,
    caller: MaybeUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<composer::ProductView>> {
    let view = state.platform.product_view(id, caller.id()).await?;
    Ok(ApiResponse::new(view))
}

/// Published episodes in order.
pub async fn episodes<D: Database>(
    State(state): State<AppState<D>>,
    caller: MaybeUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<Vec<composer::EpisodeItem>>> {
    let items = state.platform.episode_list(id, caller.id()).await?;
    Ok(ApiResponse::new(items))
}

/// Flip the caller's bookmark.
pub async fn toggle_bookmark<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<library::BookmarkState>> {
    let bookmark = state.platform.toggle_bookmark(caller.id(), id).await?;
    Ok(ApiResponse::new(bookmark))
}

/// The caller's interest window on the product.
pub async fn interest<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<library::Interest>> {
    let interest = state.platform.interest(caller.id(), id).await?;
    Ok(ApiResponse::new(interest))
}

/// Restart the caller's interest window.
pub async fn revive_interest<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<ApiResponse<library::Interest>> {
    let interest = state.platform.revive_interest(caller.id(), id).await?;
    Ok(ApiResponse::new(interest))
}

/// Buy every published paid episode the caller does not own.
pub async fn purchase_all_episodes<D: Database>(
    State(state): State<AppState<D>>,
    caller: VerifiedUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<PurchaseAllRequest>,
) -> WebResult<ApiResponse<purchase::BulkPurchase>> {
    let outcome = state
        .platform
        .purchase_all_episodes(caller.id(), id, body.profile_id)
        .await?;
    Ok(ApiResponse::new(outcome))
}

/// Donate cash to the product.
pub async fn sponsor<D: Database>(
    State(state): State<AppState<D>>,
    caller: VerifiedUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<SponsorRequest>,
) -> WebResult<ApiResponse<purchase::Sponsorship>> {
    let outcome = state
        .platform
        .sponsor(
            caller.id(),
            id,
            body.profile_id,
            body.donation_price,
            body.message,
        )
        .await?;
    Ok(ApiResponse::new(outcome))
}

/// Send a contract offer to the product's author.
pub async fn contract_offer<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
    JsonBody(terms): JsonBody<contract::OfferTerms>,
) -> WebResult<Created<ContractOffer>> {
    let offer = state
        .platform
        .create_contract_offer(caller.id(), id, terms)
        .await?;
    Ok(ApiResponse::created(offer))
}

/// Claim the free-for-first gift.
pub async fn claim_free_for_first<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<Created<GiftItem>> {
    let gift = state.platform.claim_free_for_first(caller.id(), id).await?;
    Ok(ApiResponse::created(gift))
}

/// Claim the waiting-for-free gift.
pub async fn claim_waiting_for_free<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<Created<GiftItem>> {
    let gift = state.platform.claim_waiting_for_free(caller.id(), id).await?;
    Ok(ApiResponse::created(gift))
}

/// Claim the 6-9-path gift.
pub async fn claim_six_nine_path<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
) -> WebResult<Created<GiftItem>> {
    let gift = state.platform.claim_six_nine_path(caller.id(), id).await?;
    Ok(ApiResponse::created(gift))
}
