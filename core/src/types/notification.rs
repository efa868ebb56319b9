//! Append-only user notifications.

use super::ids::{NotificationId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Notification category; preferences are per category.
    NotificationType {
        /// Promotion gifts and results
        Promotion => "promotion",
        /// Comments and replies
        Comment => "comment",
        /// Contract offers
        ContractOffer => "contract_offer",
        /// Sponsorship received
        Sponsor => "sponsor",
        /// Platform notices
        System => "system",
    }
);

/// A notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Key
    pub id: NotificationId,
    /// Recipient
    pub user_id: UserId,
    /// Category
    #[serde(rename = "notiType")]
    pub kind: NotificationType,
    /// Title
    pub title: String,
    /// Body
    pub content: Option<String>,
    /// Read flag
    #[serde(rename = "readYn", with = "super::yn")]
    pub read: bool,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Recipient
    pub user_id: UserId,
    /// Category
    pub kind: NotificationType,
    /// Title
    pub title: String,
    /// Body
    pub content: Option<String>,
}
