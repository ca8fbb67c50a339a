// SPDX-License-Identifier: MIT

//! Main chat endpoint.

use crate::error::{AppError, Result};
use crate::models::ProposedAction;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Recent notifications included as agent context.
const CHAT_CONTEXT_NOTIFICATIONS: usize = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    pub user_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_action: Option<ProposedAction>,
}

/// One agent turn; the reply may carry a proposed renewal action for the
/// confirmation popup.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.store.get_session(&payload.user_id)?;

    // Newest notifications first for "did you send me this?" questions.
    let mut notifications = state.store.notifications_for(&payload.user_id);
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications.truncate(CHAT_CONTEXT_NOTIFICATIONS);

    let turn = state
        .agent
        .handle_chat(&user, &payload.user_id, &payload.message, &notifications)
        .await?;

    Ok(Json(ChatResponse {
        reply: turn.reply,
        proposed_action: turn.proposed_action,
    }))
}
