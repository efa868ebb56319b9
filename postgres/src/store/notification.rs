use crate::PostgresTransaction;
use crate::error::map_sqlx_error;
use crate::rows::{self, NOTIFICATION_COLUMNS};
use chrono::{DateTime, Utc};
use sqlx::Row;
use webnovel_core::store::{NotificationStore, StoreResult};
use webnovel_core::types::{
    NewNotification, Notification, NotificationId, NotificationType, UserId, yn,
};

impl NotificationStore for PostgresTransaction {
    async fn insert_notification(
        &mut self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> StoreResult<Notification> {
        let row = sqlx::query(&format!(
            "INSERT INTO notifications (user_id, noti_type, title, content, created_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification.user_id.get())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::notification(&row)
    }

    async fn list_notifications(&mut self, user: UserId) -> StoreResult<Vec<Notification>> {
        let found = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_date DESC, id DESC"
        ))
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::notification)
    }

    async fn find_notification(&mut self, id: NotificationId) -> StoreResult<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::optional(row.as_ref(), rows::notification)
    }

    async fn mark_read(&mut self, id: NotificationId) -> StoreResult<()> {
        sqlx::query("UPDATE notifications SET read_yn = 'Y' WHERE id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn mark_all_read(&mut self, user: UserId) -> StoreResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read_yn = 'Y' WHERE user_id = $1 AND read_yn = 'N'")
                .bind(user.get())
                .execute(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn count_unread(&mut self, user: UserId) -> StoreResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM notifications WHERE user_id = $1 AND read_yn = 'N'",
        )
        .bind(user.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        row.try_get("n").map_err(map_sqlx_error)
    }

    async fn find_preference(
        &mut self,
        user: UserId,
        kind: NotificationType,
    ) -> StoreResult<Option<bool>> {
        let row = sqlx::query(
            "SELECT noti_type, enable_yn FROM notification_preferences
             WHERE user_id = $1 AND noti_type = $2",
        )
        .bind(user.get())
        .bind(kind.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows::optional(row.as_ref(), rows::preference)?.map(|(_, enabled)| enabled))
    }

    async fn save_preference(
        &mut self,
        user: UserId,
        kind: NotificationType,
        enabled: bool,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO notification_preferences (user_id, noti_type, enable_yn)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, noti_type) DO UPDATE SET enable_yn = EXCLUDED.enable_yn",
        )
        .bind(user.get())
        .bind(kind.as_str())
        .bind(yn::to_str(enabled))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_preferences(&mut self, user: UserId) -> StoreResult<Vec<(NotificationType, bool)>> {
        let found = sqlx::query(
            "SELECT noti_type, enable_yn FROM notification_preferences
             WHERE user_id = $1
             ORDER BY noti_type",
        )
        .bind(user.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows::all(&found, rows::preference)
    }
}
