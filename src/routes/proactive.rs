// SPDX-License-Identifier: MIT

//! Manual trigger for the proactive engine (SMS mock panel button).

use crate::error::Result;
use crate::routes::notifications::NotificationOut;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/run_proactive", post(run_proactive))
}

/// Sweep all active sessions now and return the notifications created.
async fn run_proactive(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NotificationOut>>> {
    let created = state.scanner.sweep().await;

    Ok(Json(
        created
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
