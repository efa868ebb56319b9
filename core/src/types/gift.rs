//! Giftbook (pending inventory) items and their audit trail.

use super::ids::{EpisodeId, GiftId, ProductId, UserId};
use super::ticket::{AcquisitionType, OwnType, TicketType};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Promotion that produced a gift.
    PromotionType {
        /// Direct: first-time visitors
        FreeForFirst => "free-for-first",
        /// Direct: previous bookmarkers
        ReaderOfPrev => "reader-of-prev",
        /// Applied: evening pass
        SixNinePath => "6-9-path",
        /// Applied: wait for free
        WaitingForFree => "waiting-for-free",
    }
);

tag_enum!(
    /// How a claimed ticket's lifetime is computed.
    TicketExpirationType {
        /// Never expires
        None => "none",
        /// `N` days after receipt
        Days => "days",
        /// `N` hours after receipt
        Hours => "hours",
        /// `N` days after receipt, tagged separately for audit
        OnReceiveDays => "on_receive_days",
    }
);

tag_enum!(
    /// Gift audit event.
    GiftTransactionType {
        /// Gift moved into the productbook
        Received => "received",
        /// A ticket born from the gift was redeemed
        Used => "used",
    }
);

/// Post-claim ticket lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketExpiration {
    /// Policy tag
    #[serde(rename = "ticketExpirationType")]
    pub kind: TicketExpirationType,
    /// Policy amount
    #[serde(rename = "ticketExpirationValue")]
    pub value: i32,
}

impl TicketExpiration {
    /// No expiry.
    pub const NONE: Self = Self {
        kind: TicketExpirationType::None,
        value: 0,
    };

    /// Expire `days` days after receipt.
    #[must_use]
    pub const fn days(days: i32) -> Self {
        Self {
            kind: TicketExpirationType::Days,
            value: days,
        }
    }

    /// Expire `hours` hours after receipt.
    #[must_use]
    pub const fn hours(hours: i32) -> Self {
        Self {
            kind: TicketExpirationType::Hours,
            value: hours,
        }
    }

    /// Expire `days` days after receipt (receipt-anchored tag).
    #[must_use]
    pub const fn on_receive_days(days: i32) -> Self {
        Self {
            kind: TicketExpirationType::OnReceiveDays,
            value: days,
        }
    }
}

/// A pending gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftItem {
    /// Key
    pub id: GiftId,
    /// Recipient
    pub user_id: UserId,
    /// Product scope of the tickets
    pub product_id: Option<ProductId>,
    /// Episode scope of the tickets
    pub episode_id: Option<EpisodeId>,
    /// Ticket count; `None` means one
    pub amount: Option<i32>,
    /// Ticket type
    pub ticket_type: TicketType,
    /// Own type
    pub own_type: OwnType,
    /// Producing promotion
    pub promotion_type: Option<PromotionType>,
    /// Acquisition channel of the gift
    pub acquisition_type: AcquisitionType,
    /// Acquisition source (promotion id for promotion gifts)
    pub acquisition_id: Option<i64>,
    /// Box lifetime; `None` falls back to creation + 7 days
    pub expiration_date: Option<DateTime<Utc>>,
    /// Ticket lifetime policy applied on receipt
    #[serde(flatten)]
    pub ticket_expiration: TicketExpiration,
    /// Claimed flag
    #[serde(rename = "receivedYn", with = "super::yn")]
    pub received: bool,
    /// Claim time
    pub received_date: Option<DateTime<Utc>>,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

impl GiftItem {
    /// Tickets issued on receipt.
    #[must_use]
    pub fn ticket_count(&self) -> i32 {
        self.amount.unwrap_or(1).max(1)
    }
}

/// Insert payload for a gift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGift {
    /// Recipient
    pub user_id: UserId,
    /// Product scope
    pub product_id: Option<ProductId>,
    /// Episode scope
    pub episode_id: Option<EpisodeId>,
    /// Ticket count
    pub amount: Option<i32>,
    /// Ticket type
    pub ticket_type: TicketType,
    /// Own type
    pub own_type: OwnType,
    /// Producing promotion
    pub promotion_type: Option<PromotionType>,
    /// Acquisition channel
    pub acquisition_type: AcquisitionType,
    /// Acquisition source
    pub acquisition_id: Option<i64>,
    /// Box lifetime
    pub expiration_date: Option<DateTime<Utc>>,
    /// Ticket lifetime policy
    pub ticket_expiration: TicketExpiration,
}

/// Append-only gift audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftTransaction {
    /// Key
    pub id: i64,
    /// Event type
    #[serde(rename = "type")]
    pub kind: GiftTransactionType,
    /// User
    pub user_id: UserId,
    /// Gift
    pub giftbook_id: GiftId,
    /// Tickets affected
    pub amount: i32,
    /// Free-text reason
    pub reason: String,
    /// Event time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a gift transaction.
#[derive(Debug, Clone)]
pub struct NewGiftTransaction {
    /// Event type
    pub kind: GiftTransactionType,
    /// User
    pub user_id: UserId,
    /// Gift
    pub giftbook_id: GiftId,
    /// Tickets affected
    pub amount: i32,
    /// Free-text reason
    pub reason: String,
}
