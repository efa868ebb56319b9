//! Component services.
//!
//! Every function here runs inside a transaction it is handed; it never
//! begins or commits one. The [`Platform`](crate::Platform) facade owns that
//! boundary, so one command (purchase, gift receipt, promotion issuance...)
//! composes several services atomically.
//!
//! Time comes in through [`ServiceContext`]: the clock is read once per
//! command and every rule and store call sees the same `now`.

use chrono::{DateTime, Utc};
use webnovel_core::calendar::WeekCalendar;

pub mod account;
pub mod catalog;
pub mod composer;
pub mod contract;
pub mod engagement;
pub mod giftbox;
pub mod inventory;
pub mod ledger;
pub mod library;
pub mod notification;
pub mod promotion;
pub mod purchase;

/// Per-command environment.
#[derive(Debug, Clone, Copy)]
pub struct ServiceContext {
    /// The command's single reading of the clock
    pub now: DateTime<Utc>,
    /// Local calendar for weekly windows
    pub calendar: WeekCalendar,
}

impl ServiceContext {
    /// Context at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>, calendar: WeekCalendar) -> Self {
        Self { now, calendar }
    }
}
