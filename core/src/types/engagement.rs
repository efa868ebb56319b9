//! Comments, reviews, reactions, blocks and reports.

use super::ids::{CommentId, EpisodeId, ProductId, ProfileId, ReportId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

tag_enum!(
    /// Reaction button.
    ReactionKind {
        /// Thumbs up
        Recommend => "recommend",
        /// Thumbs down
        NotRecommend => "not_recommend",
    }
);

/// Target of a reaction, block or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "targetType", content = "targetId", rename_all = "snake_case")]
pub enum ContentRef {
    /// A comment or reply
    Comment(CommentId),
    /// A review
    Review(ReviewId),
}

impl ContentRef {
    /// Stored discriminator.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Comment(_) => "comment",
            Self::Review(_) => "review",
        }
    }

    /// Stored key.
    #[must_use]
    pub const fn raw_id(self) -> i64 {
        match self {
            Self::Comment(id) => id.0,
            Self::Review(id) => id.0,
        }
    }

    /// Rebuild from stored parts.
    #[must_use]
    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "comment" => Some(Self::Comment(CommentId(id))),
            "review" => Some(Self::Review(ReviewId(id))),
            _ => None,
        }
    }
}

/// Episode comment; replies carry `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Key
    pub id: CommentId,
    /// Product
    pub product_id: ProductId,
    /// Episode
    pub episode_id: EpisodeId,
    /// Writer
    pub user_id: UserId,
    /// Writer profile
    pub profile_id: ProfileId,
    /// Parent for replies
    pub parent_id: Option<CommentId>,
    /// Body
    pub content: String,
    /// Pinned by the author
    #[serde(rename = "displayTopYn", with = "super::yn")]
    pub display_top: bool,
    /// Soft-delete flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub active: bool,
    /// Recommends
    pub count_recommend: i64,
    /// Not-recommends
    pub count_not_recommend: i64,
    /// Active replies
    pub count_reply: i64,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Product
    pub product_id: ProductId,
    /// Episode
    pub episode_id: EpisodeId,
    /// Writer
    pub user_id: UserId,
    /// Writer profile
    pub profile_id: ProfileId,
    /// Parent for replies
    pub parent_id: Option<CommentId>,
    /// Body
    pub content: String,
}

/// Product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Key
    pub id: ReviewId,
    /// Product
    pub product_id: ProductId,
    /// Writer
    pub user_id: UserId,
    /// Writer profile
    pub profile_id: ProfileId,
    /// Body
    pub content: String,
    /// Pinned by the author
    #[serde(rename = "displayTopYn", with = "super::yn")]
    pub display_top: bool,
    /// Soft-delete flag
    #[serde(rename = "useYn", with = "super::yn")]
    pub active: bool,
    /// Recommends
    pub count_recommend: i64,
    /// Not-recommends
    pub count_not_recommend: i64,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Product
    pub product_id: ProductId,
    /// Writer
    pub user_id: UserId,
    /// Writer profile
    pub profile_id: ProfileId,
    /// Body
    pub content: String,
}

/// One user's reaction row on a comment or review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Reacting user
    pub user_id: UserId,
    /// Target
    pub target: ContentRef,
    /// Recommend flag
    pub recommend: bool,
    /// Not-recommend flag
    pub not_recommend: bool,
    /// Soft-delete flag
    pub active: bool,
}

/// Viewer-side hide of a comment thread or review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Blocking viewer
    pub user_id: UserId,
    /// Hidden content
    pub target: ContentRef,
    /// Writer of the hidden content
    pub target_user_id: UserId,
    /// Block in force
    pub off: bool,
}

/// Append-only abuse report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Key
    pub id: ReportId,
    /// Reporter
    pub user_id: UserId,
    /// Reported content
    #[serde(flatten)]
    pub target: ContentRef,
    /// Reason text
    pub reason: String,
    /// Report time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// Reporter
    pub user_id: UserId,
    /// Reported content
    pub target: ContentRef,
    /// Reason text
    pub reason: String,
}
