use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, OFFER_COLUMNS};
use chrono::{DateTime, Utc};
use webnovel_core::store::{ContractStore, StoreResult};
use webnovel_core::types::{ContractOffer, ContractOfferId, NewContractOffer, ProductId, UserId, yn};

impl ContractStore for PostgresTransaction {
    async fn insert_offer(
        &mut self,
        offer: NewContractOffer,
        now: DateTime<Utc>,
    ) -> StoreResult<ContractOffer> {
        let row = sqlx::query(&format!(
            "INSERT INTO contract_offers (product_id, author_id, offerer_id, profit_type,
                                          author_profit, offer_profit, advance_payment_range,
                                          message, created_date, updated_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(offer.product_id.get())
        .bind(offer.author_id.get())
        .bind(offer.offerer_id.get())
        .bind(offer.profit_type.as_str())
        .bind(offer.author_profit)
        .bind(offer.offer_profit)
        .bind(&offer.advance_payment_range)
        .bind(&offer.message)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::contract_offer(&row)
    }

    async fn find_offer(&mut self, id: ContractOfferId) -> StoreResult<Option<ContractOffer>> {
        let row = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM contract_offers WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::contract_offer)
    }

    async fn update_offer(&mut self, offer: &ContractOffer) -> StoreResult<()> {
        sqlx::query(
            "UPDATE contract_offers SET author_accept_yn = $2, updated_date = $3 WHERE id = $1",
        )
        .bind(offer.id.get())
        .bind(offer.author_accept.map(yn::to_str))
        .bind(offer.updated_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_pending_offer(
        &mut self,
        product: ProductId,
        offerer: UserId,
    ) -> StoreResult<Option<ContractOffer>> {
        let row = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM contract_offers
             WHERE product_id = $1 AND offerer_id = $2 AND author_accept_yn IS NULL
             LIMIT 1"
        ))
        .bind(product.get())
        .bind(offerer.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::contract_offer)
    }

    async fn list_offers_for_author(&mut self, author: UserId) -> StoreResult<Vec<ContractOffer>> {
        let found = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM contract_offers
             WHERE author_id = $1
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(author.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::contract_offer)
    }

    async fn list_offers_by_offerer(
        &mut self,
        offerer: UserId,
    ) -> StoreResult<Vec<ContractOffer>> {
        let found = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM contract_offers
             WHERE offerer_id = $1
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(offerer.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::contract_offer)
    }
}
