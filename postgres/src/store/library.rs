use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows;
use chrono::{DateTime, Utc};
use sqlx::Row;
use webnovel_core::store::{LibraryStore, StoreResult};
use webnovel_core::types::{Bookmark, EpisodeId, ProductId, Recent, Usage, UserId, yn};

const USAGE_COLUMNS: &str = "user_id, product_id, episode_id, recommend_yn, not_recommend_yn, \
    created_date, updated_date";

impl LibraryStore for PostgresTransaction {
    async fn find_bookmark(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> StoreResult<Option<Bookmark>> {
        let row = sqlx::query(
            "SELECT user_id, product_id, use_yn, created_date, updated_date
             FROM bookmarks WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user.get())
        .bind(product.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::bookmark)
    }

    async fn save_bookmark(&mut self, bookmark: &Bookmark) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO bookmarks (user_id, product_id, use_yn, created_date, updated_date)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET use_yn = EXCLUDED.use_yn, updated_date = EXCLUDED.updated_date",
        )
        .bind(bookmark.user_id.get())
        .bind(bookmark.product_id.get())
        .bind(yn::to_str(bookmark.active))
        .bind(bookmark.created_date)
        .bind(bookmark.updated_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn count_active_bookmarks(&mut self, product: ProductId) -> StoreResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM bookmarks WHERE product_id = $1 AND use_yn = 'Y'",
        )
        .bind(product.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        row.try_get("n").map_err(map_sqlx_error)
    }

    async fn list_bookmarks(&mut self, user: UserId) -> StoreResult<Vec<Bookmark>> {
        let found = sqlx::query(
            "SELECT user_id, product_id, use_yn, created_date, updated_date
             FROM bookmarks
             WHERE user_id = $1 AND use_yn = 'Y'
             ORDER BY updated_date DESC, product_id DESC",
        )
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::bookmark)
    }

    async fn list_bookmarkers(&mut self, product: ProductId) -> StoreResult<Vec<UserId>> {
        let found: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM bookmarks
             WHERE product_id = $1 AND use_yn = 'Y'
             ORDER BY user_id",
        )
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(found.into_iter().map(|(id,)| UserId(id)).collect())
    }

    async fn find_usage(&mut self, user: UserId, episode: EpisodeId) -> StoreResult<Option<Usage>> {
        let row = sqlx::query(&format!(
            "SELECT {USAGE_COLUMNS} FROM usages WHERE user_id = $1 AND episode_id = $2"
        ))
        .bind(user.get())
        .bind(episode.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::usage)
    }

    async fn save_usage(&mut self, usage: &Usage) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO usages (user_id, product_id, episode_id, recommend_yn, not_recommend_yn,
                                 created_date, updated_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (user_id, episode_id)
             DO UPDATE SET recommend_yn = EXCLUDED.recommend_yn,
                           not_recommend_yn = EXCLUDED.not_recommend_yn,
                           updated_date = EXCLUDED.updated_date",
        )
        .bind(usage.user_id.get())
        .bind(usage.product_id.get())
        .bind(usage.episode_id.get())
        .bind(yn::to_str(usage.recommend))
        .bind(yn::to_str(usage.not_recommend))
        .bind(usage.created_date)
        .bind(usage.updated_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_usage(&mut self, user: UserId, product: ProductId) -> StoreResult<Vec<Usage>> {
        let found = sqlx::query(&format!(
            "SELECT {USAGE_COLUMNS} FROM usages WHERE user_id = $1 AND product_id = $2"
        ))
        .bind(user.get())
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::usage)
    }

    async fn touch_usage(
        &mut self,
        user: UserId,
        product: ProductId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE usages SET updated_date = $3 WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user.get())
        .bind(product.get())
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn count_episode_reactions(&mut self, episode: EpisodeId) -> StoreResult<(i64, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) FILTER (WHERE recommend_yn = 'Y') AS recommends,
                    COUNT(*) FILTER (WHERE not_recommend_yn = 'Y') AS not_recommends
             FROM usages WHERE episode_id = $1",
        )
        .bind(episode.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok((
            row.try_get("recommends").map_err(map_sqlx_error)?,
            row.try_get("not_recommends").map_err(map_sqlx_error)?,
        ))
    }

    async fn count_product_recommends(&mut self, product: ProductId) -> StoreResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM usages WHERE product_id = $1 AND recommend_yn = 'Y'",
        )
        .bind(product.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        row.try_get("n").map_err(map_sqlx_error)
    }

    async fn find_recent(
        &mut self,
        user: UserId,
        product: ProductId,
    ) -> StoreResult<Option<Recent>> {
        let row = sqlx::query(
            "SELECT user_id, product_id, episode_id, use_yn, updated_date
             FROM recents WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user.get())
        .bind(product.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::recent)
    }

    async fn save_recent(&mut self, recent: &Recent) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO recents (user_id, product_id, episode_id, use_yn, updated_date)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET episode_id = EXCLUDED.episode_id,
                           use_yn = EXCLUDED.use_yn,
                           updated_date = EXCLUDED.updated_date",
        )
        .bind(recent.user_id.get())
        .bind(recent.product_id.get())
        .bind(recent.episode_id.map(EpisodeId::get))
        .bind(yn::to_str(recent.active))
        .bind(recent.updated_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_recent(&mut self, user: UserId) -> StoreResult<Vec<Recent>> {
        let found = sqlx::query(
            "SELECT user_id, product_id, episode_id, use_yn, updated_date
             FROM recents
             WHERE user_id = $1 AND use_yn = 'Y'
             ORDER BY updated_date DESC, product_id DESC",
        )
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::recent)
    }
}
