use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows;
use chrono::{DateTime, Utc};
use sqlx::Row;
use webnovel_core::store::{LedgerStore, StoreResult};
use webnovel_core::types::{CashEntry, CashTransaction, NewCashTransaction, UserId};

impl LedgerStore for PostgresTransaction {
    async fn balance(&mut self, user: UserId) -> StoreResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(balance), 0)::BIGINT AS balance
             FROM cash_entries WHERE user_id = $1",
        )
        .bind(user.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        row.try_get("balance").map_err(map_sqlx_error)
    }

    async fn insert_cash_entry(
        &mut self,
        user: UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<CashEntry> {
        let row = sqlx::query(
            "INSERT INTO cash_entries (user_id, balance, created_date)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, balance, created_date",
        )
        .bind(user.get())
        .bind(delta)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::cash_entry(&row)
    }

    async fn insert_cash_transaction(
        &mut self,
        transaction: NewCashTransaction,
        now: DateTime<Utc>,
    ) -> StoreResult<CashTransaction> {
        let row = sqlx::query(
            "INSERT INTO cash_transactions (from_user, to_user, amount, reason, created_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, from_user, to_user, amount, reason, created_date",
        )
        .bind(transaction.from_user.map(UserId::get))
        .bind(transaction.to_user.map(UserId::get))
        .bind(transaction.amount)
        .bind(transaction.reason.as_str())
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::cash_transaction(&row)
    }

    async fn list_cash_transactions(&mut self, user: UserId) -> StoreResult<Vec<CashTransaction>> {
        let found = sqlx::query(
            "SELECT id, from_user, to_user, amount, reason, created_date
             FROM cash_transactions
             WHERE from_user = $1 OR to_user = $1
             ORDER BY created_date DESC, id DESC",
        )
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::cash_transaction)
    }
}
