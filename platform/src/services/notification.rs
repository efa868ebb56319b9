//! Notification sink and per-type preferences.
//!
//! Preferences are applied when writing: a suppressed notification is never
//! stored, so the table stays a faithful log of what the user was shown.

use super::ServiceContext;
use serde::Serialize;
use webnovel_core::store::NotificationStore;
use webnovel_core::types::{
    NewNotification, Notification, NotificationId, NotificationType, UserId,
};
use webnovel_core::{ErrorCode, PlatformResult};

/// One preference switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    /// Notification type
    #[serde(rename = "notiType")]
    pub kind: NotificationType,
    /// Whether notifications of this type are written
    pub enabled: bool,
}

/// Append a notification unless the recipient switched its type off.
///
/// Returns the stored row, or `None` when suppressed.
///
/// # Errors
///
/// Storage failures.
pub async fn notify<S: NotificationStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    notification: NewNotification,
) -> PlatformResult<Option<Notification>> {
    let enabled = tx
        .find_preference(notification.user_id, notification.kind)
        .await?
        .unwrap_or(true);
    if !enabled {
        tracing::debug!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification suppressed by preference"
        );
        return Ok(None);
    }
    Ok(Some(tx.insert_notification(notification, ctx.now).await?))
}

/// Notifications of a user, newest first.
///
/// # Errors
///
/// Storage failures.
pub async fn list<S: NotificationStore>(
    tx: &mut S,
    user: UserId,
) -> PlatformResult<Vec<Notification>> {
    Ok(tx.list_notifications(user).await?)
}

/// Mark one notification read.
///
/// # Errors
///
/// [`ErrorCode::NotificationNotFound`] when missing or addressed to someone
/// else.
pub async fn mark_read<S: NotificationStore>(
    tx: &mut S,
    user: UserId,
    id: NotificationId,
) -> PlatformResult<Notification> {
    let mut found = tx
        .find_notification(id)
        .await?
        .filter(|n| n.user_id == user)
        .ok_or(ErrorCode::NotificationNotFound)?;
    if !found.read {
        tx.mark_read(id).await?;
        found.read = true;
    }
    Ok(found)
}

/// Mark every notification of a user read; returns how many changed.
///
/// # Errors
///
/// Storage failures.
pub async fn mark_all_read<S: NotificationStore>(tx: &mut S, user: UserId) -> PlatformResult<u64> {
    Ok(tx.mark_all_read(user).await?)
}

/// Unread count.
///
/// # Errors
///
/// Storage failures.
pub async fn count_unread<S: NotificationStore>(tx: &mut S, user: UserId) -> PlatformResult<i64> {
    Ok(tx.count_unread(user).await?)
}

/// Every notification type with its effective switch (absent rows are on).
///
/// # Errors
///
/// Storage failures.
pub async fn list_preferences<S: NotificationStore>(
    tx: &mut S,
    user: UserId,
) -> PlatformResult<Vec<Preference>> {
    let stored = tx.list_preferences(user).await?;
    Ok(NotificationType::ALL
        .iter()
        .map(|&kind| Preference {
            kind,
            enabled: stored
                .iter()
                .find(|(k, _)| *k == kind)
                .is_none_or(|(_, enabled)| *enabled),
        })
        .collect())
}

/// Switch one notification type on or off.
///
/// # Errors
///
/// Storage failures.
pub async fn set_preference<S: NotificationStore>(
    tx: &mut S,
    user: UserId,
    kind: NotificationType,
    enabled: bool,
) -> PlatformResult<Preference> {
    tx.save_preference(user, kind, enabled).await?;
    Ok(Preference { kind, enabled })
}
