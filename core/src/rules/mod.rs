//! Pure business decisions.
//!
//! Each function takes the rows it needs plus `now` and returns a decision
//! or an [`ErrorCode`](crate::ErrorCode). Services load the rows, call the
//! rule, and write the outcome inside one transaction.

pub mod catalog;
pub mod contract;
pub mod gift_expiry;
pub mod interest;
pub mod profile;
pub mod promotion;
pub mod reaction;
pub mod ticket_selection;

/// Price of one paid episode in cash.
pub const EPISODE_PRICE: i64 = 100;

/// Lifetime of a rental bought with cash, in days.
pub const CASH_RENTAL_DAYS: i64 = 3;
