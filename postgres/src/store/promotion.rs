use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, APPLIED_COLUMNS, DIRECT_COLUMNS};
use chrono::{DateTime, Utc};
use sqlx::Row;
use webnovel_core::store::{PromotionStore, StoreResult};
use webnovel_core::types::{
    AppliedPromotion, AppliedPromotionId, AppliedPromotionStatus, DirectPromotion,
    DirectPromotionId, DirectPromotionStatus, DirectPromotionType, NewAppliedPromotion,
    NewDirectPromotion, ProductId, UserId,
};

impl PromotionStore for PostgresTransaction {
    async fn find_direct(&mut self, id: DirectPromotionId) -> StoreResult<Option<DirectPromotion>> {
        let row = sqlx::query(&format!(
            "SELECT {DIRECT_COLUMNS} FROM direct_promotions WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::direct_promotion)
    }

    async fn list_direct_for_product(
        &mut self,
        product: ProductId,
    ) -> StoreResult<Vec<DirectPromotion>> {
        let found = sqlx::query(&format!(
            "SELECT {DIRECT_COLUMNS} FROM direct_promotions
             WHERE product_id = $1
             ORDER BY created_date, id"
        ))
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::direct_promotion)
    }

    async fn list_direct_for_author(
        &mut self,
        author: UserId,
        kind: DirectPromotionType,
    ) -> StoreResult<Vec<DirectPromotion>> {
        let found = sqlx::query(&format!(
            "SELECT {DIRECT_COLUMNS} FROM direct_promotions
             WHERE author_id = $1 AND type = $2
             ORDER BY created_date, id"
        ))
        .bind(author.get())
        .bind(kind.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::direct_promotion)
    }

    async fn insert_direct(
        &mut self,
        promotion: NewDirectPromotion,
        now: DateTime<Utc>,
    ) -> StoreResult<DirectPromotion> {
        let row = sqlx::query(&format!(
            "INSERT INTO direct_promotions (product_id, author_id, type, status,
                                            num_of_ticket_per_person, created_date, updated_date)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {DIRECT_COLUMNS}"
        ))
        .bind(promotion.product_id.get())
        .bind(promotion.author_id.get())
        .bind(promotion.kind.as_str())
        .bind(DirectPromotionStatus::Pending.as_str())
        .bind(promotion.num_of_ticket_per_person)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::direct_promotion(&row)
    }

    async fn update_direct(&mut self, promotion: &DirectPromotion) -> StoreResult<()> {
        sqlx::query(
            "UPDATE direct_promotions
             SET status = $2, num_of_ticket_per_person = $3, start_date = $4, updated_date = $5
             WHERE id = $1",
        )
        .bind(promotion.id.get())
        .bind(promotion.status.as_str())
        .bind(promotion.num_of_ticket_per_person)
        .bind(promotion.start_date)
        .bind(promotion.updated_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_applied(
        &mut self,
        id: AppliedPromotionId,
    ) -> StoreResult<Option<AppliedPromotion>> {
        let row = sqlx::query(&format!(
            "SELECT {APPLIED_COLUMNS} FROM applied_promotions WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::applied_promotion)
    }

    async fn list_applied_for_product(
        &mut self,
        product: ProductId,
    ) -> StoreResult<Vec<AppliedPromotion>> {
        let found = sqlx::query(&format!(
            "SELECT {APPLIED_COLUMNS} FROM applied_promotions
             WHERE product_id = $1
             ORDER BY created_date, id"
        ))
        .bind(product.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::applied_promotion)
    }

    async fn list_applied(
        &mut self,
        status: Option<AppliedPromotionStatus>,
    ) -> StoreResult<Vec<AppliedPromotion>> {
        let found = sqlx::query(&format!(
            "SELECT {APPLIED_COLUMNS} FROM applied_promotions
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_date, id"
        ))
        .bind(status.map(AppliedPromotionStatus::as_str))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::applied_promotion)
    }

    async fn count_ing_applied_created_between(
        &mut self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM applied_promotions
             WHERE status = $1 AND created_date >= $2 AND created_date < $3",
        )
        .bind(AppliedPromotionStatus::Ing.as_str())
        .bind(from)
        .bind(until)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        row.try_get("n").map_err(map_sqlx_error)
    }

    async fn insert_applied(
        &mut self,
        promotion: NewAppliedPromotion,
        now: DateTime<Utc>,
    ) -> StoreResult<AppliedPromotion> {
        let row = sqlx::query(&format!(
            "INSERT INTO applied_promotions (product_id, author_id, type, status, start_date,
                                             end_date, num_of_ticket_per_person, created_date,
                                             updated_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {APPLIED_COLUMNS}"
        ))
        .bind(promotion.product_id.get())
        .bind(promotion.author_id.get())
        .bind(promotion.kind.as_str())
        .bind(AppliedPromotionStatus::Apply.as_str())
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.num_of_ticket_per_person)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::applied_promotion(&row)
    }

    async fn update_applied(&mut self, promotion: &AppliedPromotion) -> StoreResult<()> {
        sqlx::query("UPDATE applied_promotions SET status = $2, updated_date = $3 WHERE id = $1")
            .bind(promotion.id.get())
            .bind(promotion.status.as_str())
            .bind(promotion.updated_date)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
