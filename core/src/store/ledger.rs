use super::StoreResult;
use crate::types::{CashEntry, CashTransaction, NewCashTransaction, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Cash entries and transactions.
pub trait LedgerStore {
    /// `SUM(cash_entry.balance)` for the user, as seen by this transaction.
    fn balance(&mut self, user: UserId) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Append a signed entry.
    fn insert_cash_entry(
        &mut self,
        user: UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<CashEntry>> + Send;

    /// Append a transaction row.
    fn insert_cash_transaction(
        &mut self,
        transaction: NewCashTransaction,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<CashTransaction>> + Send;

    /// Transactions paid or received by the user, newest first.
    fn list_cash_transactions(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = StoreResult<Vec<CashTransaction>>> + Send;
}
