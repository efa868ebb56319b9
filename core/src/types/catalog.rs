//! Products (works) and episodes.

use super::ids::{EpisodeId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Whether reading costs anything.
    PriceType {
        /// Free to read
        Free => "free",
        /// Requires a ticket
        Paid => "paid",
    }
);

tag_enum!(
    /// Audience rating.
    Rating {
        /// All ages
        All => "all",
        /// Adults only
        Adult => "adult",
    }
);

tag_enum!(
    /// Serialization status of a work.
    ProductStatus {
        /// Still publishing
        Ongoing => "ongoing",
        /// On hiatus
        Rest => "rest",
        /// Completed
        End => "end",
        /// Suspended by operators
        Stop => "stop",
    }
);

tag_enum!(
    /// Commercial type of a work.
    ProductType {
        /// Free work
        Free => "free",
        /// Standard work
        Normal => "normal",
        /// Paid work
        Paid => "paid",
    }
);

/// Denormalized counters on a product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductCounter {
    /// `count_hit`
    Hit,
    /// `count_bookmark`
    Bookmark,
    /// `count_recommend`
    Recommend,
    /// `count_review`
    Review,
}

/// Denormalized counters on an episode row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeCounter {
    /// `count_hit`
    Hit,
    /// `count_recommend`
    Recommend,
    /// `count_not_recommend`
    NotRecommend,
    /// `count_comment`
    Comment,
}

/// A serialized work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Key
    pub id: ProductId,
    /// Author
    pub author_id: UserId,
    /// Title
    pub title: String,
    /// Price type
    pub price_type: PriceType,
    /// Rating
    pub rating: Rating,
    /// Status
    pub status: ProductStatus,
    /// Commercial type
    pub product_type: ProductType,
    /// Primary genre name
    pub primary_genre: Option<String>,
    /// Sub genre name
    pub sub_genre: Option<String>,
    /// Keywords (stored pipe-separated)
    pub keywords: Vec<String>,
    /// Cover image path from file metadata
    pub cover_image_path: Option<String>,
    /// Total episode opens
    pub count_hit: i64,
    /// Active bookmarks
    pub count_bookmark: i64,
    /// Episode recommends across the work
    pub count_recommend: i64,
    /// Active reviews
    pub count_review: i64,
    /// Last time an episode was opened for reading
    pub last_episode_date: Option<DateTime<Utc>>,
    /// Soft-delete flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub active: bool,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

impl Product {
    /// Join keywords into the stored pipe-separated form.
    #[must_use]
    pub fn keywords_text(keywords: &[String]) -> String {
        keywords.join("|")
    }

    /// Split the stored pipe-separated keywords.
    #[must_use]
    pub fn parse_keywords(text: &str) -> Vec<String> {
        text.split('|')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Insert payload for a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Author
    pub author_id: UserId,
    /// Title
    pub title: String,
    /// Price type
    pub price_type: PriceType,
    /// Rating
    pub rating: Rating,
    /// Commercial type
    pub product_type: ProductType,
    /// Primary genre
    pub primary_genre: Option<String>,
    /// Sub genre
    pub sub_genre: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Cover image path
    pub cover_image_path: Option<String>,
}

/// One installment of a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Key
    pub id: EpisodeId,
    /// Owning product
    pub product_id: ProductId,
    /// Monotone number within the product
    pub episode_no: i32,
    /// Title
    pub title: String,
    /// Price type
    pub price_type: PriceType,
    /// Published flag
    #[serde(rename = "openYn", with = "super::yn")]
    pub open: bool,
    /// Scheduled publish time
    pub publish_reserve_date: Option<DateTime<Utc>>,
    /// Opens
    pub count_hit: i64,
    /// Recommends
    pub count_recommend: i64,
    /// Not-recommends
    pub count_not_recommend: i64,
    /// Active comments
    pub count_comment: i64,
    /// Soft-delete flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub active: bool,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

impl Episode {
    /// Open, live, and past its reserve date (if any).
    #[must_use]
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.active && self.open && self.publish_reserve_date.is_none_or(|at| at <= now)
    }

    /// Paid episodes need a ticket.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.price_type == PriceType::Paid
    }
}

/// Insert payload for an episode.
#[derive(Debug, Clone)]
pub struct NewEpisode {
    /// Owning product
    pub product_id: ProductId,
    /// Number within the product
    pub episode_no: i32,
    /// Title
    pub title: String,
    /// Price type
    pub price_type: PriceType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_split_on_pipes_and_drop_blanks() {
        assert_eq!(
            Product::parse_keywords("romance| fantasy||regression "),
            vec!["romance", "fantasy", "regression"]
        );
        assert!(Product::parse_keywords("").is_empty());
    }
}
