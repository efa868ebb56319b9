//! Productbook (claimed inventory) tickets.
//!
//! One flat row covers every ticket shape: episode-scoped (`episode_id`
//! set), product-scoped (`product_id` set, `episode_id` null) and universal
//! (both null), each either a time-bounded rental or a permanent own ticket.

use super::ids::{DirectPromotionId, EpisodeId, ProductId, ProfileId, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Rental (time-bounded) or own (permanent).
    OwnType {
        /// Time-bounded right to read
        Rental => "rental",
        /// Permanent right to read
        Own => "own",
    }
);

tag_enum!(
    /// Commercial origin of the ticket.
    TicketType {
        /// Granted for free
        Free => "free",
        /// Paid for with cash
        Paid => "paid",
        /// Granted by an event
        Event => "event",
    }
);

tag_enum!(
    /// How the ticket was acquired.
    AcquisitionType {
        /// Bought with cash
        Purchase => "purchase",
        /// Claimed from the gift box
        Gift => "gift",
        /// Issued directly by a promotion
        Promotion => "promotion",
    }
);

/// A productbook row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Key
    pub id: TicketId,
    /// Owner
    pub user_id: UserId,
    /// Owner profile
    pub profile_id: ProfileId,
    /// Product scope; `None` is universal
    pub product_id: Option<ProductId>,
    /// Episode scope; `None` is product-scoped
    pub episode_id: Option<EpisodeId>,
    /// Rental or own
    pub own_type: OwnType,
    /// Commercial origin
    pub ticket_type: TicketType,
    /// Acquisition channel
    pub acquisition_type: AcquisitionType,
    /// Source row of the acquisition (gift id, cash transaction id...)
    pub acquisition_id: Option<i64>,
    /// Free-for-first promotion whose live status gates this ticket
    pub source_promotion_id: Option<DirectPromotionId>,
    /// Rental expiry; `None` is unlimited
    pub rental_expired_date: Option<DateTime<Utc>>,
    /// Redeemed flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub used: bool,
    /// Redemption time
    pub use_date: Option<DateTime<Utc>>,
    /// Issue time
    pub created_date: DateTime<Utc>,
}

impl Ticket {
    /// Expired when the rental expiry is strictly in the past.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.rental_expired_date.is_some_and(|at| at < now)
    }

    /// Whether this ticket can open `episode` of `product` by scope alone.
    #[must_use]
    pub fn covers(&self, product: ProductId, episode: EpisodeId) -> bool {
        match (self.product_id, self.episode_id) {
            (_, Some(e)) => e == episode,
            (Some(p), None) => p == product,
            (None, None) => true,
        }
    }
}

/// Insert payload for a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Owner
    pub user_id: UserId,
    /// Owner profile
    pub profile_id: ProfileId,
    /// Product scope
    pub product_id: Option<ProductId>,
    /// Episode scope
    pub episode_id: Option<EpisodeId>,
    /// Rental or own
    pub own_type: OwnType,
    /// Commercial origin
    pub ticket_type: TicketType,
    /// Acquisition channel
    pub acquisition_type: AcquisitionType,
    /// Acquisition source row
    pub acquisition_id: Option<i64>,
    /// Gating free-for-first promotion
    pub source_promotion_id: Option<DirectPromotionId>,
    /// Rental expiry
    pub rental_expired_date: Option<DateTime<Utc>>,
}
