//! Transactional storage traits.
//!
//! A [`Database`] hands out [`Transaction`]s. Every state-changing operation
//! runs inside exactly one transaction: primary writes, counter
//! reconciliation and notification appends commit together or not at all.
//! Dropping a transaction without calling [`Transaction::commit`] rolls it
//! back.
//!
//! The per-component traits are deliberately narrow; services declare the
//! subset they need (`S: LedgerStore + TicketStore`) and the transaction type
//! implements them all.
//!
//! Methods never read a clock. Anything time-dependent receives `now` from
//! the caller.

use std::future::Future;
use thiserror::Error;

mod account;
mod catalog;
mod contract;
mod engagement;
mod gift;
mod ledger;
mod library;
mod notification;
mod promotion;
mod ticket;

pub use account::AccountStore;
pub use catalog::CatalogStore;
pub use contract::ContractStore;
pub use engagement::EngagementStore;
pub use gift::GiftStore;
pub use ledger::LedgerStore;
pub use library::LibraryStore;
pub use notification::NotificationStore;
pub use promotion::PromotionStore;
pub use ticket::TicketStore;

/// Storage failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Query or mapping failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Pool exhausted, connection lost, or serialization failure; retryable.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// A unique or check constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Conflict(String),
}

/// Result alias for storage calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// One database transaction exposing every component store.
pub trait Transaction:
    AccountStore
    + CatalogStore
    + LedgerStore
    + TicketStore
    + GiftStore
    + LibraryStore
    + PromotionStore
    + ContractStore
    + EngagementStore
    + NotificationStore
    + Send
{
    /// Make all writes durable.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] when the commit could not be serialized
    /// against concurrent transactions.
    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Source of transactions.
pub trait Database: Send + Sync + 'static {
    /// Transaction type.
    type Tx: Transaction;

    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] when no connection can be acquired.
    fn begin(&self) -> impl Future<Output = StoreResult<Self::Tx>> + Send;
}
