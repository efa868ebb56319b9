use super::StoreResult;
use crate::types::{
    Episode, EpisodeCounter, EpisodeId, NewEpisode, NewProduct, Product, ProductCounter,
    ProductId, UserId,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Products and episodes.
pub trait CatalogStore {
    /// Product by key, including soft-deleted rows.
    fn find_product(
        &mut self,
        id: ProductId,
    ) -> impl Future<Output = StoreResult<Option<Product>>> + Send;

    /// Live products of an author, newest first.
    fn list_products_by_author(
        &mut self,
        author: UserId,
    ) -> impl Future<Output = StoreResult<Vec<Product>>> + Send;

    /// Insert a product.
    fn insert_product(
        &mut self,
        product: NewProduct,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Product>> + Send;

    /// Overwrite a product's mutable columns (not its counters).
    fn update_product(&mut self, product: &Product)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Write one denormalized product counter.
    fn set_product_counter(
        &mut self,
        id: ProductId,
        counter: ProductCounter,
        value: i64,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Episode by key, including soft-deleted rows.
    fn find_episode(
        &mut self,
        id: EpisodeId,
    ) -> impl Future<Output = StoreResult<Option<Episode>>> + Send;

    /// Live episodes of a product by `episode_no`.
    fn list_episodes(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<Episode>>> + Send;

    /// Insert an episode.
    fn insert_episode(
        &mut self,
        episode: NewEpisode,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Episode>> + Send;

    /// Overwrite an episode's mutable columns (not its counters).
    fn update_episode(&mut self, episode: &Episode)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Write one denormalized episode counter.
    fn set_episode_counter(
        &mut self,
        id: EpisodeId,
        counter: EpisodeCounter,
        value: i64,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}
