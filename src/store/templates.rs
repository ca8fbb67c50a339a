// SPDX-License-Identifier: MIT

//! Template identity loading.
//!
//! Template users are parsed once at startup; a parse failure is fatal so
//! the server never runs with an unusable template set.

use crate::models::TemplateUser;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Immutable registry of demo identities, keyed by national id.
#[derive(Default, Clone)]
pub struct TemplateRegistry {
    users: HashMap<String, TemplateUser>,
}

impl TemplateRegistry {
    /// Load template users from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| TemplateError::Io(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load template users from a JSON array string.
    pub fn load_from_json(json_data: &str) -> Result<Self, TemplateError> {
        let raw_users: Vec<TemplateUser> =
            serde_json::from_str(json_data).map_err(|e| TemplateError::Parse(e.to_string()))?;

        if raw_users.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut users = HashMap::new();
        for user in raw_users {
            if users.insert(user.national_id.clone(), user).is_some() {
                return Err(TemplateError::Parse(
                    "duplicate national_id in template data".to_string(),
                ));
            }
        }

        tracing::info!(count = users.len(), "Loaded template users");
        Ok(Self { users })
    }

    /// Find a template user by login username.
    pub fn find_by_username(&self, username: &str) -> Option<&TemplateUser> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Template loading errors (fatal at startup).
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read template file: {0}")]
    Io(String),

    #[error("Malformed template data: {0}")]
    Parse(String),

    #[error("Template file contains no users")]
    Empty,
}
