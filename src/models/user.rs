// SPDX-License-Identifier: MIT

//! Template identities and per-login session users.

use crate::models::service::{ServiceKind, ServiceRecord};
use serde::{Deserialize, Serialize};

/// A demo identity loaded from `users.json` at startup.
///
/// Template users are never mutated; each login clones one into an
/// independent [`SessionUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateUser {
    pub national_id: String,
    /// Mock login username.
    pub username: String,
    /// Mock login password (demo only, stored in plain text).
    pub password: String,
    pub name: String,
    pub phone_number: String,
    pub services: Vec<ServiceRecord>,
}

impl TemplateUser {
    /// Produce the owned, independent per-session aggregate.
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            national_id: self.national_id.clone(),
            name: self.name.clone(),
            phone_number: self.phone_number.clone(),
            services: self.services.clone(),
        }
    }
}

/// Runtime clone of a template identity, keyed by an opaque session id.
///
/// Lives for the process lifetime; no two sessions share mutable service
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub national_id: String,
    pub name: String,
    pub phone_number: String,
    pub services: Vec<ServiceRecord>,
}

impl SessionUser {
    /// Look up a tracked service by kind.
    pub fn service(&self, kind: ServiceKind) -> Option<&ServiceRecord> {
        self.services.iter().find(|s| s.service_type == kind)
    }

    /// Services that carry an expiry date (the ones the scanner evaluates).
    pub fn tracked_services(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.services.iter().filter(|s| s.expiry_date.is_some())
    }
}
