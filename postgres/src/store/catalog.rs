use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, EPISODE_COLUMNS, PRODUCT_COLUMNS};
use chrono::{DateTime, Utc};
use webnovel_core::store::{CatalogStore, StoreResult};
use webnovel_core::types::{
    Episode, EpisodeCounter, EpisodeId, NewEpisode, NewProduct, Product, ProductCounter,
    ProductId, ProductStatus, UserId, yn,
};

const fn product_counter_column(counter: ProductCounter) -> &'static str {
    match counter {
        ProductCounter::Hit => "count_hit",
        ProductCounter::Bookmark => "count_bookmark",
        ProductCounter::Recommend => "count_recommend",
        ProductCounter::Review => "count_review",
    }
}

const fn episode_counter_column(counter: EpisodeCounter) -> &'static str {
    match counter {
        EpisodeCounter::Hit => "count_hit",
        EpisodeCounter::Recommend => "count_recommend",
        EpisodeCounter::NotRecommend => "count_not_recommend",
        EpisodeCounter::Comment => "count_comment",
    }
}

impl CatalogStore for PostgresTransaction {
    async fn find_product(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::product)
    }

    async fn list_products_by_author(&mut self, author: UserId) -> StoreResult<Vec<Product>> {
        let found = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE author_id = $1 AND use_yn = 'Y'
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(author.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::product)
    }

    async fn insert_product(
        &mut self,
        product: NewProduct,
        now: DateTime<Utc>,
    ) -> StoreResult<Product> {
        let row = sqlx::query(&format!(
            "INSERT INTO products (author_id, title, price_type, rating, status, product_type,
                                   primary_genre, sub_genre, keywords, cover_image_path,
                                   created_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.author_id.get())
        .bind(&product.title)
        .bind(product.price_type.as_str())
        .bind(product.rating.as_str())
        .bind(ProductStatus::Ongoing.as_str())
        .bind(product.product_type.as_str())
        .bind(&product.primary_genre)
        .bind(&product.sub_genre)
        .bind(Product::keywords_text(&product.keywords))
        .bind(&product.cover_image_path)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::product(&row)
    }

    async fn update_product(&mut self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            "UPDATE products
             SET title = $2, price_type = $3, rating = $4, status = $5, product_type = $6,
                 primary_genre = $7, sub_genre = $8, keywords = $9, cover_image_path = $10,
                 last_episode_date = $11, use_yn = $12
             WHERE id = $1",
        )
        .bind(product.id.get())
        .bind(&product.title)
        .bind(product.price_type.as_str())
        .bind(product.rating.as_str())
        .bind(product.status.as_str())
        .bind(product.product_type.as_str())
        .bind(&product.primary_genre)
        .bind(&product.sub_genre)
        .bind(Product::keywords_text(&product.keywords))
        .bind(&product.cover_image_path)
        .bind(product.last_episode_date)
        .bind(yn::to_str(product.active))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn set_product_counter(
        &mut self,
        id: ProductId,
        counter: ProductCounter,
        value: i64,
    ) -> StoreResult<()> {
        let column = product_counter_column(counter);
        sqlx::query(&format!("UPDATE products SET {column} = $2 WHERE id = $1"))
            .bind(id.get())
            .bind(value)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_episode(&mut self, id: EpisodeId) -> StoreResult<Option<Episode>> {
        let row = sqlx::query(&format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::episode)
    }

    async fn list_episodes(&mut self, product: ProductId) -> StoreResult<Vec<Episode>> {
        let found = sqlx::query(&format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes
             WHERE product_id = $1 AND use_yn = 'Y'
             ORDER BY episode_no, id"
        ))
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::episode)
    }

    async fn insert_episode(
        &mut self,
        episode: NewEpisode,
        now: DateTime<Utc>,
    ) -> StoreResult<Episode> {
        let row = sqlx::query(&format!(
            "INSERT INTO episodes (product_id, episode_no, title, price_type, created_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {EPISODE_COLUMNS}"
        ))
        .bind(episode.product_id.get())
        .bind(episode.episode_no)
        .bind(&episode.title)
        .bind(episode.price_type.as_str())
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::episode(&row)
    }

    async fn update_episode(&mut self, episode: &Episode) -> StoreResult<()> {
        sqlx::query(
            "UPDATE episodes
             SET title = $2, price_type = $3, open_yn = $4, publish_reserve_date = $5, use_yn = $6
             WHERE id = $1",
        )
        .bind(episode.id.get())
        .bind(&episode.title)
        .bind(episode.price_type.as_str())
        .bind(yn::to_str(episode.open))
        .bind(episode.publish_reserve_date)
        .bind(yn::to_str(episode.active))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn set_episode_counter(
        &mut self,
        id: EpisodeId,
        counter: EpisodeCounter,
        value: i64,
    ) -> StoreResult<()> {
        let column = episode_counter_column(counter);
        sqlx::query(&format!("UPDATE episodes SET {column} = $2 WHERE id = $1"))
            .bind(id.get())
            .bind(value)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
