use super::StoreResult;
use crate::types::{NewNotification, Notification, NotificationId, NotificationType, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Notification items and per-type preferences.
pub trait NotificationStore {
    /// Append an unread notification.
    fn insert_notification(
        &mut self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Notification>> + Send;

    /// Notifications of a user, newest first.
    fn list_notifications(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = StoreResult<Vec<Notification>>> + Send;

    /// Notification by key.
    fn find_notification(
        &mut self,
        id: NotificationId,
    ) -> impl Future<Output = StoreResult<Option<Notification>>> + Send;

    /// Set `read_yn = 'Y'` on one row.
    fn mark_read(&mut self, id: NotificationId) -> impl Future<Output = StoreResult<()>> + Send;

    /// Set `read_yn = 'Y'` on every unread row of a user; returns the count.
    fn mark_all_read(&mut self, user: UserId) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Unread notifications of a user.
    fn count_unread(&mut self, user: UserId) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Stored preference; `None` when never set.
    fn find_preference(
        &mut self,
        user: UserId,
        kind: NotificationType,
    ) -> impl Future<Output = StoreResult<Option<bool>>> + Send;

    /// Upsert a preference.
    fn save_preference(
        &mut self,
        user: UserId,
        kind: NotificationType,
        enabled: bool,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Stored preferences of a user.
    fn list_preferences(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = StoreResult<Vec<(NotificationType, bool)>>> + Send;
}
