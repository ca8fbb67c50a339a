// SPDX-License-Identifier: MIT

//! Session and notification storage.
//!
//! The store is an explicit interface so the in-memory demo backend can be
//! swapped for a persistence engine without touching the workflows.

pub mod memory;
pub mod templates;

pub use memory::MemoryStore;
pub use templates::{TemplateError, TemplateRegistry};

use crate::error::Result;
use crate::models::{Notification, ServiceKind, SessionUser};
use chrono::{DateTime, Utc};

/// Metadata `source` tags written by the subsystems that append
/// notifications.
pub mod sources {
    pub const LOGIN_SUMMARY: &str = "login_summary";
    pub const PROACTIVE_ENGINE: &str = "proactive_engine";
}

/// Storage interface for session users and the append-only notification log.
///
/// Sessions are logically independent; the notification log is shared.
/// Implementations must keep `append_notification` atomic with respect to
/// concurrent readers (callers serialize scans per session on top of this).
pub trait SessionStore: Send + Sync {
    /// Register a new session user under a fresh opaque id and return it.
    fn create_session(&self, user: SessionUser) -> String;

    /// Fetch a snapshot of a session user.
    fn get_session(&self, session_id: &str) -> Result<SessionUser>;

    /// Ids of all currently active sessions (for periodic sweeps).
    fn session_ids(&self) -> Vec<String>;

    /// Advance a service's expiry date. The only mutation of service state;
    /// rejects a date earlier than the current expiry, so expiries only ever
    /// move forward.
    fn set_service_expiry(
        &self,
        session_id: &str,
        kind: ServiceKind,
        new_expiry: DateTime<Utc>,
    ) -> Result<()>;

    /// Append to the notification log. Notifications are immutable once
    /// appended and are never deleted.
    fn append_notification(&self, notification: Notification);

    /// All notifications for one session, in insertion order.
    fn notifications_for(&self, session_id: &str) -> Vec<Notification>;
}
