// SPDX-License-Identifier: MIT

//! Notification history for the SMS + in-app panels.

use crate::error::Result;
use crate::models::{Channel, NotificationMeta};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/notifications/{user_id}", get(list_notifications))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct NotificationOut {
    pub id: String,
    pub channel: Channel,
    pub message: String,
    pub created_at: String,
    pub meta: NotificationMeta,
}

/// List all notifications for a session user, newest first.
async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<NotificationOut>>> {
    // 404 for unknown sessions, matching the rest of the API.
    let _ = state.store.get_session(&user_id)?;

    let mut notifications = state.store.notifications_for(&user_id);
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(
        notifications
            .into_iter()
            .map(|n| NotificationOut {
                id: n.id,
                channel: n.channel,
                message: n.message,
                created_at: format_utc_rfc3339(n.created_at),
                meta: n.meta,
            })
            .collect(),
    ))
}
