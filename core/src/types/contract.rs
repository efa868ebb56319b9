//! Contract offers from content partners to authors.

use super::ids::{ContractOfferId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// How profit is split.
    ProfitType {
        /// Percentages summing to 100
        Percent => "percent",
        /// Fixed amounts
        Amount => "amount",
    }
);

/// Negotiation state derived from `author_accept_yn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferState {
    /// `null`
    Pending,
    /// `Y`
    Accepted,
    /// `N`
    Rejected,
}

/// A contract offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractOffer {
    /// Key
    pub id: ContractOfferId,
    /// Target product
    pub product_id: ProductId,
    /// Product author (recipient)
    pub author_id: UserId,
    /// Content partner making the offer
    pub offerer_id: UserId,
    /// Split kind
    pub profit_type: ProfitType,
    /// Author share
    pub author_profit: i32,
    /// Offerer share
    pub offer_profit: i32,
    /// Advance-payment range code such as `50~100`
    pub advance_payment_range: String,
    /// Message to the author
    pub message: String,
    /// `None` pending, `Some(true)` accepted, `Some(false)` rejected
    #[serde(rename = "authorAcceptYn", with = "super::yn::option")]
    pub author_accept: Option<bool>,
    /// Creation time
    pub created_date: DateTime<Utc>,
    /// Last change
    pub updated_date: DateTime<Utc>,
}

impl ContractOffer {
    /// Current negotiation state.
    #[must_use]
    pub const fn state(&self) -> OfferState {
        match self.author_accept {
            None => OfferState::Pending,
            Some(true) => OfferState::Accepted,
            Some(false) => OfferState::Rejected,
        }
    }
}

/// Insert payload for an offer.
#[derive(Debug, Clone)]
pub struct NewContractOffer {
    /// Target product
    pub product_id: ProductId,
    /// Product author
    pub author_id: UserId,
    /// Offerer
    pub offerer_id: UserId,
    /// Split kind
    pub profit_type: ProfitType,
    /// Author share
    pub author_profit: i32,
    /// Offerer share
    pub offer_profit: i32,
    /// Advance-payment range code
    pub advance_payment_range: String,
    /// Message
    pub message: String,
}
