//! Bookmarks, reading usage and the recent list.

use super::ids::{EpisodeId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// A reader's relation to a product under the three-day interest window.
    InterestStatus {
        /// Read within the window with more than a day left
        Active => "interest_active",
        /// Inside the window with less than a day left
        DropSoon => "interest_drop_soon",
        /// Window elapsed
        Loss => "interest_loss",
        /// Never read
        None => "interest_none",
    }
);

/// One bookmark per (user, product); toggled through `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Bookmarker
    pub user_id: UserId,
    /// Bookmarked product
    pub product_id: ProductId,
    /// Live flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub active: bool,
    /// First bookmark time
    pub created_date: DateTime<Utc>,
    /// Last toggle time
    pub updated_date: DateTime<Utc>,
}

/// Per (user, product, episode) reading row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Reader
    pub user_id: UserId,
    /// Product
    pub product_id: ProductId,
    /// Episode
    pub episode_id: EpisodeId,
    /// Recommend flag
    #[serde(rename = "recommendYn", with = "super::yn")]
    pub recommend: bool,
    /// Not-recommend flag
    #[serde(rename = "notRecommendYn", with = "super::yn")]
    pub not_recommend: bool,
    /// First open
    pub created_date: DateTime<Utc>,
    /// Interest-window anchor
    pub updated_date: DateTime<Utc>,
}

/// Recently read product, ordered by `updated_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recent {
    /// Reader
    pub user_id: UserId,
    /// Product
    pub product_id: ProductId,
    /// Last episode opened
    pub episode_id: Option<EpisodeId>,
    /// Live flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub active: bool,
    /// Last open
    pub updated_date: DateTime<Utc>,
}
