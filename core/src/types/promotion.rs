//! Direct (author-run) and applied (operator-approved) promotions.

use super::gift::PromotionType;
use super::ids::{AppliedPromotionId, DirectPromotionId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Direct promotion kinds.
    DirectPromotionType {
        /// Free rental for first-time visitors
        FreeForFirst => "free-for-first",
        /// Weekly gift to previous bookmarkers
        ReaderOfPrev => "reader-of-prev",
    }
);

impl DirectPromotionType {
    /// Tag stamped on gifts this promotion produces.
    #[must_use]
    pub const fn gift_type(self) -> PromotionType {
        match self {
            Self::FreeForFirst => PromotionType::FreeForFirst,
            Self::ReaderOfPrev => PromotionType::ReaderOfPrev,
        }
    }
}

tag_enum!(
    /// Direct promotion life cycle.
    DirectPromotionStatus {
        /// Saved, never started
        Pending => "pending",
        /// Running
        Ing => "ing",
        /// Paused
        Stop => "stop",
        /// Finished (terminal)
        End => "end",
    }
);

tag_enum!(
    /// Applied promotion kinds.
    AppliedPromotionType {
        /// Wait for free
        WaitingForFree => "waiting-for-free",
        /// Evening pass
        SixNinePath => "6-9-path",
    }
);

impl AppliedPromotionType {
    /// Tag stamped on gifts this promotion produces.
    #[must_use]
    pub const fn gift_type(self) -> PromotionType {
        match self {
            Self::WaitingForFree => PromotionType::WaitingForFree,
            Self::SixNinePath => PromotionType::SixNinePath,
        }
    }
}

tag_enum!(
    /// Applied promotion life cycle.
    AppliedPromotionStatus {
        /// Waiting for operator review
        Apply => "apply",
        /// Running
        Ing => "ing",
        /// Finished
        End => "end",
        /// Withdrawn by the author
        Cancel => "cancel",
        /// Refused by an operator
        Deny => "deny",
    }
);

/// Author-run promotion on one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectPromotion {
    /// Key
    pub id: DirectPromotionId,
    /// Product
    pub product_id: ProductId,
    /// Owning author
    pub author_id: UserId,
    /// Kind
    #[serde(rename = "type")]
    pub kind: DirectPromotionType,
    /// Status
    pub status: DirectPromotionStatus,
    /// Tickets granted per recipient
    pub num_of_ticket_per_person: i32,
    /// Last start (or reader-of-prev issuance) time
    pub start_date: Option<DateTime<Utc>>,
    /// Creation time
    pub created_date: DateTime<Utc>,
    /// Last change
    pub updated_date: DateTime<Utc>,
}

/// Insert payload for a direct promotion.
#[derive(Debug, Clone)]
pub struct NewDirectPromotion {
    /// Product
    pub product_id: ProductId,
    /// Owning author
    pub author_id: UserId,
    /// Kind
    pub kind: DirectPromotionType,
    /// Tickets per recipient
    pub num_of_ticket_per_person: i32,
}

/// Operator-approved promotion on one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromotion {
    /// Key
    pub id: AppliedPromotionId,
    /// Product
    pub product_id: ProductId,
    /// Applying author
    pub author_id: UserId,
    /// Kind
    #[serde(rename = "type")]
    pub kind: AppliedPromotionType,
    /// Status
    pub status: AppliedPromotionStatus,
    /// Requested start
    pub start_date: DateTime<Utc>,
    /// Requested end
    pub end_date: DateTime<Utc>,
    /// Tickets granted per claim
    pub num_of_ticket_per_person: i32,
    /// Creation time (weekly slot anchor)
    pub created_date: DateTime<Utc>,
    /// Last change (deny date for cool-downs)
    pub updated_date: DateTime<Utc>,
}

/// Insert payload for an applied promotion.
#[derive(Debug, Clone)]
pub struct NewAppliedPromotion {
    /// Product
    pub product_id: ProductId,
    /// Applying author
    pub author_id: UserId,
    /// Kind
    pub kind: AppliedPromotionType,
    /// Requested start
    pub start_date: DateTime<Utc>,
    /// Requested end
    pub end_date: DateTime<Utc>,
    /// Tickets per claim
    pub num_of_ticket_per_person: i32,
}
