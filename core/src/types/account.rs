//! Users and reader profiles.

use super::ids::{ProfileId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

tag_enum!(
    /// Platform role.
    Role {
        /// Reader
        User => "user",
        /// Writer
        Author => "author",
        /// Content partner company
        Cp => "cp",
        /// Catalog editor
        Editor => "editor",
        /// Administrator
        Admin => "admin",
    }
);

impl Role {
    /// Editors and admins operate the applied-promotion queue.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(self, Self::Editor | Self::Admin)
    }
}

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Key
    pub id: UserId,
    /// Identity-provider subject claim
    pub subject: String,
    /// Role
    pub role: Role,
    /// Identity verification passed
    #[serde(rename = "identityVerifiedYn", with = "super::yn")]
    pub identity_verified: bool,
    /// Phone recorded at verification
    pub phone: Option<String>,
    /// Email; rewritten on withdrawal
    pub email: Option<String>,
    /// Soft-delete flag (withdrawn)
    #[serde(skip)]
    pub deleted: bool,
    /// Signup time
    pub created_date: DateTime<Utc>,
}

impl User {
    /// Email rewrite applied on withdrawal: `outed;<unix-ts>;<original>`.
    #[must_use]
    pub fn outed_email(original: &str, at: DateTime<Utc>) -> String {
        format!("outed;{};{original}", at.timestamp())
    }
}

/// Insert payload for a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Identity-provider subject
    pub subject: String,
    /// Role
    pub role: Role,
    /// Email from the identity provider
    pub email: Option<String>,
}

/// A reader persona owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Key
    pub id: ProfileId,
    /// Owner
    pub user_id: UserId,
    /// Display name
    pub nickname: String,
    /// Free renames left
    pub free_rename_count: i32,
    /// Purchased renames left
    pub paid_rename_count: i32,
    /// The user's default profile
    #[serde(rename = "defaultYn", with = "super::yn")]
    pub is_default: bool,
    /// Creation time
    pub created_date: DateTime<Utc>,
}

/// Insert payload for a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    /// Owner
    pub user_id: UserId,
    /// Display name
    pub nickname: String,
    /// Whether it becomes the default
    pub is_default: bool,
}
