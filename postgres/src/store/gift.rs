use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, GIFT_COLUMNS};
use chrono::{DateTime, Utc};
use webnovel_core::store::{GiftStore, StoreResult};
use webnovel_core::types::{
    EpisodeId, GiftId, GiftItem, GiftTransaction, GiftTransactionType, NewGift,
    NewGiftTransaction, ProductId, PromotionType, UserId, yn,
};

const GIFT_TRANSACTION_COLUMNS: &str = "id, type, user_id, giftbook_id, amount, reason, created_date";

impl GiftStore for PostgresTransaction {
    async fn insert_gift(&mut self, gift: NewGift, now: DateTime<Utc>) -> StoreResult<GiftItem> {
        let row = sqlx::query(&format!(
            "INSERT INTO giftbook (user_id, product_id, episode_id, amount, ticket_type, own_type,
                                   promotion_type, acquisition_type, acquisition_id,
                                   expiration_date, ticket_expiration_type,
                                   ticket_expiration_value, created_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {GIFT_COLUMNS}"
        ))
        .bind(gift.user_id.get())
        .bind(gift.product_id.map(ProductId::get))
        .bind(gift.episode_id.map(EpisodeId::get))
        .bind(gift.amount)
        .bind(gift.ticket_type.as_str())
        .bind(gift.own_type.as_str())
        .bind(gift.promotion_type.map(PromotionType::as_str))
        .bind(gift.acquisition_type.as_str())
        .bind(gift.acquisition_id)
        .bind(gift.expiration_date)
        .bind(gift.ticket_expiration.kind.as_str())
        .bind(gift.ticket_expiration.value)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::gift(&row)
    }

    async fn find_gift(&mut self, id: GiftId) -> StoreResult<Option<GiftItem>> {
        let row = sqlx::query(&format!("SELECT {GIFT_COLUMNS} FROM giftbook WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::gift)
    }

    async fn update_gift(&mut self, gift: &GiftItem) -> StoreResult<()> {
        sqlx::query("UPDATE giftbook SET received_yn = $2, received_date = $3 WHERE id = $1")
            .bind(gift.id.get())
            .bind(yn::to_str(gift.received))
            .bind(gift.received_date)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_gifts(&mut self, user: UserId) -> StoreResult<Vec<GiftItem>> {
        let found = sqlx::query(&format!(
            "SELECT {GIFT_COLUMNS} FROM giftbook
             WHERE user_id = $1
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::gift)
    }

    async fn list_user_promotion_gifts(
        &mut self,
        user: UserId,
        product: ProductId,
        promotion_type: PromotionType,
    ) -> StoreResult<Vec<GiftItem>> {
        let found = sqlx::query(&format!(
            "SELECT {GIFT_COLUMNS} FROM giftbook
             WHERE user_id = $1 AND product_id = $2 AND promotion_type = $3"
        ))
        .bind(user.get())
        .bind(product.get())
        .bind(promotion_type.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::gift)
    }

    async fn list_promotion_gifts(
        &mut self,
        promotion_type: PromotionType,
        promotion_id: i64,
    ) -> StoreResult<Vec<GiftItem>> {
        let found = sqlx::query(&format!(
            "SELECT {GIFT_COLUMNS} FROM giftbook
             WHERE promotion_type = $1 AND acquisition_id = $2"
        ))
        .bind(promotion_type.as_str())
        .bind(promotion_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::gift)
    }

    async fn insert_gift_transaction(
        &mut self,
        transaction: NewGiftTransaction,
        now: DateTime<Utc>,
    ) -> StoreResult<GiftTransaction> {
        let row = sqlx::query(&format!(
            "INSERT INTO gift_transactions (type, user_id, giftbook_id, amount, reason, created_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {GIFT_TRANSACTION_COLUMNS}"
        ))
        .bind(transaction.kind.as_str())
        .bind(transaction.user_id.get())
        .bind(transaction.giftbook_id.get())
        .bind(transaction.amount)
        .bind(&transaction.reason)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::gift_transaction(&row)
    }

    async fn list_gift_transactions(
        &mut self,
        user: UserId,
        kind: Option<GiftTransactionType>,
    ) -> StoreResult<Vec<GiftTransaction>> {
        let found = sqlx::query(&format!(
            "SELECT {GIFT_TRANSACTION_COLUMNS} FROM gift_transactions
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR type = $2)
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(user.get())
        .bind(kind.map(GiftTransactionType::as_str))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::gift_transaction)
    }
}
