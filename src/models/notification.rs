// SPDX-License-Identifier: MIT

//! Notification records (SMS + in-app), append-only once created.

use crate::models::service::ServiceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Delivery channel for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub enum Channel {
    Sms,
    InApp,
}

/// Structured notification metadata.
///
/// SMS reminders must carry `service_type` (dedup key) and should carry
/// `days_left`/`expiry_date` for observability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct NotificationMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Whole days until expiry; negative once expired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
    /// Which subsystem produced the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// An immutable record of a message sent to a session user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Owning session id.
    pub user_id: String,
    pub channel: Channel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub meta: NotificationMeta,
}

impl Notification {
    pub fn new(
        user_id: &str,
        channel: Channel,
        message: String,
        meta: NotificationMeta,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            channel,
            message,
            created_at: Utc::now(),
            meta,
        }
    }
}
