//! Works and episodes as seen by their author.

use super::ServiceContext;
use serde::Deserialize;
use webnovel_core::rules::catalog;
use webnovel_core::store::CatalogStore;
use webnovel_core::types::{
    Episode, EpisodeId, NewEpisode, NewProduct, PriceType, Product, ProductId, ProductStatus,
    ProductType, Rating, UserId,
};
use webnovel_core::{DateTime, ErrorCode, PlatformResult, Utc};

/// Fields an author fills in for a new work.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Title
    pub title: String,
    /// Price type
    pub price_type: PriceType,
    /// Rating
    pub rating: Rating,
    /// Commercial type
    pub product_type: ProductType,
    /// Primary genre
    #[serde(default)]
    pub primary_genre: Option<String>,
    /// Sub genre
    #[serde(default)]
    pub sub_genre: Option<String>,
    /// Keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Cover image path
    #[serde(default)]
    pub cover_image_path: Option<String>,
}

/// Live product.
///
/// # Errors
///
/// [`ErrorCode::ProductNotFound`] when missing or soft-deleted.
pub async fn find_product<S: CatalogStore>(tx: &mut S, id: ProductId) -> PlatformResult<Product> {
    tx.find_product(id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ErrorCode::ProductNotFound.into())
}

/// Live product that `author` wrote.
///
/// # Errors
///
/// * [`ErrorCode::ProductNotFound`]
/// * [`ErrorCode::NotProductAuthor`] for anyone but the author
pub async fn authored_product<S: CatalogStore>(
    tx: &mut S,
    author: UserId,
    id: ProductId,
) -> PlatformResult<Product> {
    let product = find_product(tx, id).await?;
    if product.author_id != author {
        tracing::warn!(user_id = %author, product_id = %id, "Not the product author");
        return Err(ErrorCode::NotProductAuthor.into());
    }
    Ok(product)
}

/// Live episode.
///
/// # Errors
///
/// [`ErrorCode::EpisodeNotFound`] when missing or soft-deleted.
pub async fn find_episode<S: CatalogStore>(tx: &mut S, id: EpisodeId) -> PlatformResult<Episode> {
    tx.find_episode(id)
        .await?
        .filter(|e| e.active)
        .ok_or_else(|| ErrorCode::EpisodeNotFound.into())
}

/// Live episodes of a product in episode order.
///
/// # Errors
///
/// Storage failures.
pub async fn list_episodes<S: CatalogStore>(
    tx: &mut S,
    product: ProductId,
) -> PlatformResult<Vec<Episode>> {
    let mut episodes: Vec<Episode> = tx
        .list_episodes(product)
        .await?
        .into_iter()
        .filter(|e| e.active)
        .collect();
    episodes.sort_by_key(|e| e.episode_no);
    Ok(episodes)
}

/// Create a work owned by `author`.
///
/// # Errors
///
/// [`ErrorCode::InvalidProductField`] for a blank or oversized title or too
/// many keywords.
pub async fn create_product<S: CatalogStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    draft: ProductDraft,
) -> PlatformResult<Product> {
    let keywords: Vec<String> = draft
        .keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    catalog::validate_product_fields(&draft.title, &keywords)?;
    let product = tx
        .insert_product(
            NewProduct {
                author_id: author,
                title: draft.title.trim().to_string(),
                price_type: draft.price_type,
                rating: draft.rating,
                product_type: draft.product_type,
                primary_genre: draft.primary_genre,
                sub_genre: draft.sub_genre,
                keywords,
                cover_image_path: draft.cover_image_path,
            },
            ctx.now,
        )
        .await?;
    tracing::info!(user_id = %author, product_id = %product.id, "Product created");
    Ok(product)
}

/// Change a work's serialization status.
///
/// # Errors
///
/// See [`authored_product`].
pub async fn update_status<S: CatalogStore>(
    tx: &mut S,
    author: UserId,
    id: ProductId,
    status: ProductStatus,
) -> PlatformResult<Product> {
    let mut product = authored_product(tx, author, id).await?;
    product.status = status;
    tx.update_product(&product).await?;
    Ok(product)
}

/// Append an unpublished episode numbered after the current last one.
///
/// # Errors
///
/// * [`ErrorCode::InvalidEpisodeField`] for a blank or oversized title
/// * see [`authored_product`]
pub async fn create_episode<S: CatalogStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    product: ProductId,
    title: &str,
    price_type: PriceType,
) -> PlatformResult<Episode> {
    catalog::validate_episode_title(title)?;
    authored_product(tx, author, product).await?;
    let next_no = tx
        .list_episodes(product)
        .await?
        .iter()
        .map(|e| e.episode_no)
        .max()
        .unwrap_or(0)
        + 1;
    let episode = tx
        .insert_episode(
            NewEpisode {
                product_id: product,
                episode_no: next_no,
                title: title.trim().to_string(),
                price_type,
            },
            ctx.now,
        )
        .await?;
    tracing::info!(product_id = %product, episode_id = %episode.id, episode_no = next_no, "Episode created");
    Ok(episode)
}

/// Publish an episode, optionally at a reserved time.
///
/// The product's `last_episode_date` moves to the publish time.
///
/// # Errors
///
/// * [`ErrorCode::EpisodeNotFound`]
/// * see [`authored_product`]
pub async fn publish_episode<S: CatalogStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    author: UserId,
    episode: EpisodeId,
    reserve: Option<DateTime<Utc>>,
) -> PlatformResult<Episode> {
    let mut found = find_episode(tx, episode).await?;
    let mut product = authored_product(tx, author, found.product_id).await?;
    found.open = true;
    found.publish_reserve_date = reserve;
    tx.update_episode(&found).await?;

    let published_at = reserve.unwrap_or(ctx.now);
    if product.last_episode_date.is_none_or(|last| last < published_at) {
        product.last_episode_date = Some(published_at);
        tx.update_product(&product).await?;
    }
    tracing::info!(product_id = %product.id, episode_id = %episode, "Episode published");
    Ok(found)
}
