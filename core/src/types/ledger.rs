//! Cash ledger rows.

use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Why cash moved.
    CashReason {
        /// Top-up from an external payment (origin out of scope)
        Charge => "charge",
        /// Single episode bought to own
        EpisodePurchase => "episode_purchase",
        /// Single episode rented
        EpisodeRental => "episode_rental",
        /// All-at-once purchase of a product's paid episodes
        BulkPurchase => "bulk_purchase",
        /// Donation to a product
        Sponsor => "sponsor",
        /// Manual correction by an administrator
        Adjustment => "adjustment",
    }
);

/// Signed balance delta. A user's balance is the sum of their entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashEntry {
    /// Key
    pub id: i64,
    /// Owner
    pub user_id: UserId,
    /// Signed delta
    pub balance: i64,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

/// Transfer record paired with one or more entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTransaction {
    /// Key
    pub id: i64,
    /// Payer; `None` for system-originated credits
    pub from_user: Option<UserId>,
    /// Payee; `None` for outflows to the system
    pub to_user: Option<UserId>,
    /// Positive amount
    pub amount: i64,
    /// Reason
    pub reason: CashReason,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a cash transaction.
#[derive(Debug, Clone)]
pub struct NewCashTransaction {
    /// Payer
    pub from_user: Option<UserId>,
    /// Payee
    pub to_user: Option<UserId>,
    /// Positive amount
    pub amount: i64,
    /// Reason
    pub reason: CashReason,
}
