//! Author catalog endpoints.
//!
//! - POST /api/author/products                 - new product
//! - PUT  /api/author/products/:id/status      - ongoing / rest / end
//! - POST /api/author/products/:id/episodes    - new, unpublished episode
//! - PUT  /api/author/episodes/:id/open        - publish now or at `reserve_date`

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::catalog::ProductDraft;
use axum::extract::{Path, State};
use serde::Deserialize;
use webnovel_core::store::Database;
use webnovel_core::types::{Episode, EpisodeId, PriceType, Product, ProductId, ProductStatus};
use webnovel_core::{DateTime, Utc};
use webnovel_web::{ApiResponse, Created, JsonBody, WebResult};

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status
    pub status: ProductStatus,
}

/// Body of a new episode.
#[derive(Debug, Deserialize)]
pub struct EpisodeRequest {
    /// Title
    pub title: String,
    /// Free or paid
    pub price_type: PriceType,
}

/// Body of an episode publication.
#[derive(Debug, Default, Deserialize)]
pub struct OpenRequest {
    /// Future publication time; now when absent
    #[serde(default)]
    pub reserve_date: Option<DateTime<Utc>>,
}

/// Create a product owned by the caller.
pub async fn create_product<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    JsonBody(draft): JsonBody<ProductDraft>,
) -> WebResult<Created<Product>> {
    let product = state.platform.create_product(caller.id(), draft).await?;
    Ok(ApiResponse::created(product))
}

/// Change the serialization status.
pub async fn update_status<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<StatusRequest>,
) -> WebResult<ApiResponse<Product>> {
    let product = state
        .platform
        .update_product_status(caller.id(), id, body.status)
        .await?;
    Ok(ApiResponse::new(product))
}

/// Add an episode at the next number.
pub async fn create_episode<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<ProductId>,
    JsonBody(body): JsonBody<EpisodeRequest>,
) -> WebResult<Created<Episode>> {
    let episode = state
        .platform
        .create_episode(caller.id(), id, &body.title, body.price_type)
        .await?;
    Ok(ApiResponse::created(episode))
}

/// Publish an episode now or at a reserved time.
pub async fn open_episode<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<EpisodeId>,
    JsonBody(body): JsonBody<OpenRequest>,
) -> WebResult<ApiResponse<Episode>> {
    let episode = state
        .platform
        .publish_episode(caller.id(), id, body.reserve_date)
        .await?;
    Ok(ApiResponse::new(episode))
}
