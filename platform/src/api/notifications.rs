//! Notification endpoints.
//!
//! - GET /api/notifications
//! - PUT /api/notifications                     - mark all read
//! - PUT /api/notifications/:id/read
//! - GET /api/notification-preferences
//! - PUT /api/notification-preferences/:type    - `{"enabled": bool}`

#![allow(clippy::missing_errors_doc)]

use super::AuthUser;
use crate::server::AppState;
use crate::services::notification::Preference;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use webnovel_core::store::Database;
use webnovel_core::types::{Notification, NotificationId, NotificationType};
use webnovel_web::{ApiResponse, JsonBody, WebResult};

/// Body of a preference change.
#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    /// Deliver this category
    pub enabled: bool,
}

/// Result of a bulk read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedRead {
    /// Rows flipped to read
    pub updated: u64,
}

/// Caller's notifications, newest first.
pub async fn list<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<Notification>>> {
    let rows = state.platform.notifications(caller.id()).await?;
    Ok(ApiResponse::new(rows))
}

/// Mark one notification read.
pub async fn mark_read<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(id): Path<NotificationId>,
) -> WebResult<ApiResponse<Notification>> {
    let row = state.platform.mark_notification_read(caller.id(), id).await?;
    Ok(ApiResponse::new(row))
}

/// Mark every notification read.
pub async fn mark_all_read<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<MarkedRead>> {
    let updated = state.platform.mark_all_notifications_read(caller.id()).await?;
    Ok(ApiResponse::new(MarkedRead { updated }))
}

/// Every category with its delivery switch.
pub async fn preferences<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
) -> WebResult<ApiResponse<Vec<Preference>>> {
    let rows = state.platform.notification_preferences(caller.id()).await?;
    Ok(ApiResponse::new(rows))
}

/// Switch one category on or off.
pub async fn set_preference<D: Database>(
    State(state): State<AppState<D>>,
    caller: AuthUser,
    Path(kind): Path<NotificationType>,
    JsonBody(body): JsonBody<PreferenceRequest>,
) -> WebResult<ApiResponse<Preference>> {
    let row = state
        .platform
        .set_notification_preference(caller.id(), kind, body.enabled)
        .await?;
    Ok(ApiResponse::new(row))
}
