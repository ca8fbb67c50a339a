// SPDX-License-Identifier: MIT

//! Proactive expiry reminders.
//!
//! Walks a session user's tracked services, classifies each one, and emits
//! at most one SMS reminder per service per rolling dedup window. Scans of
//! the same session are serialized through a per-session lock; scans of
//! different sessions run concurrently. A composer failure skips only that
//! service's reminder.

use crate::models::{Channel, Notification, NotificationMeta, ServiceKind};
use crate::services::composer::MessageComposer;
use crate::services::expiry;
use crate::store::{sources, SessionStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const MAX_CONCURRENT_SCANS: usize = 8;

/// Scans sessions for expiring services and appends SMS reminders.
pub struct ProactiveScanner {
    store: Arc<dyn SessionStore>,
    composer: MessageComposer,
    /// One lock per session id; serializes on-demand and periodic scans of
    /// the same session.
    scan_locks: DashMap<String, Arc<Mutex<()>>>,
    threshold_days: i64,
    dedup_days: i64,
}

impl ProactiveScanner {
    pub fn new(
        store: Arc<dyn SessionStore>,
        composer: MessageComposer,
        threshold_days: i64,
        dedup_days: i64,
    ) -> Self {
        Self {
            store,
            composer,
            scan_locks: DashMap::new(),
            threshold_days,
            dedup_days,
        }
    }

    /// Scan a single session and return the reminders created.
    ///
    /// Errors only when the session is unknown; per-service composer
    /// failures are logged and contained.
    pub async fn scan_session(&self, session_id: &str) -> crate::error::Result<Vec<Notification>> {
        let lock = self
            .scan_locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let user = self.store.get_session(session_id)?;
        let now = Utc::now();
        let mut created = Vec::new();

        for service in user.tracked_services() {
            let Some(expiry_date) = service.expiry_date else {
                continue;
            };

            let status = expiry::classify(expiry_date, now, self.threshold_days);
            if !status.is_renewable() {
                continue;
            }
            if self.recently_reminded(session_id, service.service_type, now) {
                continue;
            }

            let sms = match self
                .composer
                .reminder_sms(&user, service, expiry_date, status)
                .await
            {
                Ok(sms) => sms,
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        service = %service.service_type,
                        error = %e,
                        "Reminder text generation failed, skipping this service"
                    );
                    continue;
                }
            };

            let notification = Notification::new(
                session_id,
                Channel::Sms,
                sms,
                NotificationMeta {
                    service_type: Some(service.service_type),
                    expiry_date: Some(expiry_date),
                    days_left: Some(status.days_left()),
                    source: Some(sources::PROACTIVE_ENGINE.to_string()),
                },
            );

            tracing::info!(
                session_id = %session_id,
                phone = %user.phone_number,
                service = %service.service_type,
                days_left = status.days_left(),
                "Sending proactive SMS"
            );
            self.store.append_notification(notification.clone());
            created.push(notification);
        }

        Ok(created)
    }

    /// Sweep every active session. Per-session failures are logged, never
    /// propagated; returns all reminders created across the sweep.
    pub async fn sweep(&self) -> Vec<Notification> {
        let session_ids = self.store.session_ids();

        let results: Vec<Vec<Notification>> = stream::iter(session_ids)
            .map(|session_id| async move {
                match self.scan_session(&session_id).await {
                    Ok(created) => created,
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Session scan failed");
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_SCANS)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    /// An SMS reminder for this (session, kind) exists within the dedup
    /// window.
    fn recently_reminded(&self, session_id: &str, kind: ServiceKind, now: DateTime<Utc>) -> bool {
        self.store
            .notifications_for(session_id)
            .iter()
            .any(|n| {
                n.channel == Channel::Sms
                    && n.meta.service_type == Some(kind)
                    && (now - n.created_at).num_days() < self.dedup_days
            })
    }
}

/// Run periodic sweeps on a tokio timer, detached from request handling.
/// Fire-and-forget; failures inside the sweep are already contained.
pub fn spawn_periodic(scanner: Arc<ProactiveScanner>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so startup isn't a sweep.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let created = scanner.sweep().await;
            if !created.is_empty() {
                tracing::info!(count = created.len(), "Proactive sweep emitted reminders");
            }
        }
    })
}
