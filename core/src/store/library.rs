use super::StoreResult;
use crate::types::{Bookmark, EpisodeId, ProductId, Recent, Usage, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Bookmarks, usage rows and the recent list.
pub trait LibraryStore {
    /// Bookmark row for (user, product), live or not.
    fn find_bookmark(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Option<Bookmark>>> + Send;

    /// Upsert on (user, product).
    fn save_bookmark(&mut self, bookmark: &Bookmark)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Live bookmarks on a product.
    fn count_active_bookmarks(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Live bookmarks of a user, most recently toggled first.
    fn list_bookmarks(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = StoreResult<Vec<Bookmark>>> + Send;

    /// Users with a live bookmark on a product, by user key.
    fn list_bookmarkers(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<UserId>>> + Send;

    /// Usage row for (user, episode).
    fn find_usage(
        &mut self,
        user: UserId,
        episode: EpisodeId,
    ) -> impl Future<Output = StoreResult<Option<Usage>>> + Send;

    /// Upsert on (user, episode).
    fn save_usage(&mut self, usage: &Usage) -> impl Future<Output = StoreResult<()>> + Send;

    /// Usage rows of a user on a product.
    fn list_usage(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Vec<Usage>>> + Send;

    /// Set `updated_date = now` on every usage row of (user, product);
    /// returns the number of rows touched.
    fn touch_usage(
        &mut self,
        user: UserId,
        product: ProductId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// `(recommends, not_recommends)` across usage rows of an episode.
    fn count_episode_reactions(
        &mut self,
        episode: EpisodeId,
    ) -> impl Future<Output = StoreResult<(i64, i64)>> + Send;

    /// Recommends across usage rows of a product.
    fn count_product_recommends(
        &mut self,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Recent row for (user, product), live or not.
    fn find_recent(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> impl Future<Output = StoreResult<Option<Recent>>> + Send;

    /// Upsert on (user, product).
    fn save_recent(&mut self, recent: &Recent) -> impl Future<Output = StoreResult<()>> + Send;

    /// Live recent rows, most recent first.
    fn list_recent(&mut self, user: UserId)
    -> impl Future<Output = StoreResult<Vec<Recent>>> + Send;
}
