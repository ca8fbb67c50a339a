// SPDX-License-Identifier: MIT

//! Default in-process store: a concurrent session map plus a shared
//! append-only notification log.

use crate::error::{AppError, Result};
use crate::models::{Notification, ServiceKind, SessionUser};
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::RwLock;

/// In-memory store. Sessions live for the process lifetime; nothing is
/// persisted across restarts.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<String, SessionUser>,
    notifications: RwLock<Vec<Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn create_session(&self, user: SessionUser) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            session_id = %session_id,
            national_id = %user.national_id,
            "Created session user from template"
        );
        self.sessions.insert(session_id.clone(), user);
        session_id
    }

    fn get_session(&self, session_id: &str) -> Result<SessionUser> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::UnknownSession(session_id.to_string()))
    }

    fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    fn set_service_expiry(
        &self,
        session_id: &str,
        kind: ServiceKind,
        new_expiry: DateTime<Utc>,
    ) -> Result<()> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::UnknownSession(session_id.to_string()))?;

        let service = entry
            .services
            .iter_mut()
            .find(|s| s.service_type == kind)
            .ok_or_else(|| {
                AppError::BadRequest(format!("No {} service on this account", kind.label()))
            })?;

        // Expiry dates only move forward.
        if let Some(current) = service.expiry_date {
            if new_expiry < current {
                return Err(AppError::BadRequest(format!(
                    "Refusing to move {} expiry backwards",
                    kind.label()
                )));
            }
        }

        service.expiry_date = Some(new_expiry);
        Ok(())
    }

    fn append_notification(&self, notification: Notification) {
        let mut log = self
            .notifications
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        log.push(notification);
    }

    fn notifications_for(&self, session_id: &str) -> Vec<Notification> {
        let log = self
            .notifications
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        log.iter()
            .filter(|n| n.user_id == session_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, NotificationMeta, ServiceRecord};
    use chrono::Duration;

    fn sample_user() -> SessionUser {
        SessionUser {
            national_id: "1234567890".to_string(),
            name: "Test User".to_string(),
            phone_number: "+966500000000".to_string(),
            services: vec![ServiceRecord::new(
                ServiceKind::Passport,
                Some(Utc::now() + Duration::days(30)),
            )],
        }
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_session("nope"),
            Err(AppError::UnknownSession(_))
        ));
    }

    #[test]
    fn test_expiry_never_moves_backwards() {
        let store = MemoryStore::new();
        let id = store.create_session(sample_user());
        let forward = Utc::now() + Duration::days(400);

        store
            .set_service_expiry(&id, ServiceKind::Passport, forward)
            .expect("forward move allowed");
        let err = store.set_service_expiry(&id, ServiceKind::Passport, Utc::now());
        assert!(matches!(err, Err(AppError::BadRequest(_))));

        let user = store.get_session(&id).unwrap();
        assert_eq!(
            user.service(ServiceKind::Passport).unwrap().expiry_date,
            Some(forward)
        );
    }

    #[test]
    fn test_notification_log_is_per_session() {
        let store = MemoryStore::new();
        let a = store.create_session(sample_user());
        let b = store.create_session(sample_user());

        store.append_notification(Notification::new(
            &a,
            Channel::InApp,
            "hello".to_string(),
            NotificationMeta::default(),
        ));

        assert_eq!(store.notifications_for(&a).len(), 1);
        assert!(store.notifications_for(&b).is_empty());
    }
}
