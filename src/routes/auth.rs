// SPDX-License-Identifier: MIT

//! Login against the template identities.
//!
//! Each successful login clones the template into a fresh session user, so
//! multiple people can use the same demo accounts in parallel without
//! sharing service state.

use crate::error::{AppError, Result};
use crate::models::{Channel, Notification, NotificationMeta};
use crate::store::sources;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct LoginResponse {
    /// Opaque session id; the frontend uses this as user_id from here on.
    pub user_id: String,
    pub name: String,
}

/// Authenticate against a template user and create a session clone.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let template = state
        .templates
        .find_by_username(&payload.username)
        .filter(|t| t.password == payload.password)
        .ok_or(AppError::Unauthorized)?;

    let name = template.name.clone();
    let session_id = state.store.create_session(template.to_session_user());

    // Login summary and the first proactive scan are best-effort: both run
    // off the request path, and a composer failure only costs the
    // notification.
    spawn_login_summary(state.clone(), session_id.clone());
    spawn_login_scan(state.clone(), session_id.clone());

    Ok(Json(LoginResponse {
        user_id: session_id,
        name,
    }))
}

fn spawn_login_summary(state: Arc<AppState>, session_id: String) {
    tokio::spawn(async move {
        let Ok(user) = state.store.get_session(&session_id) else {
            return;
        };

        match state
            .composer
            .login_summary(&user, state.config.expiry_threshold_days)
            .await
        {
            Ok(summary) => {
                state.store.append_notification(Notification::new(
                    &session_id,
                    Channel::InApp,
                    summary.in_app,
                    NotificationMeta {
                        source: Some(sources::LOGIN_SUMMARY.to_string()),
                        ..Default::default()
                    },
                ));
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to generate login summary notification"
                );
            }
        }
    });
}

/// On-demand scan of the fresh session, so an expiring service is flagged
/// right after login instead of waiting for the next periodic sweep.
fn spawn_login_scan(state: Arc<AppState>, session_id: String) {
    tokio::spawn(async move {
        if let Err(e) = state.scanner.scan_session(&session_id).await {
            tracing::warn!(
                session_id = %session_id,
                error = %e,
                "Post-login proactive scan failed"
            );
        }
    });
}
