// SPDX-License-Identifier: MIT

//! Confirm or reject an action proposed by the agent.

use crate::error::Result;
use crate::models::ServiceKind;
use crate::services::renewal::ConfirmOutcome;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/confirm-action", post(confirm_action))
}

#[derive(Deserialize)]
pub struct ConfirmActionRequest {
    pub user_id: String,
    pub action_id: String,
    /// Target service; optional because older clients only echo the action
    /// id (the recorded proposal then resolves the target).
    #[serde(default)]
    pub service_type: Option<ServiceKind>,
    pub accepted: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct ConfirmActionResponse {
    /// "accepted" or "rejected".
    pub status: String,
    pub detail: String,
}

/// Confirm step of the renewal workflow. Eligibility and fee were already
/// recomputed server-side; this handler only translates the outcome into
/// the response contract. An ineligible service is a successful no-op, not
/// an error.
async fn confirm_action(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmActionRequest>,
) -> Result<Json<ConfirmActionResponse>> {
    let outcome = state.renewal.confirm(
        &payload.user_id,
        &payload.action_id,
        payload.service_type,
        payload.accepted,
    )?;

    let (status, detail) = match outcome {
        ConfirmOutcome::Renewed(renewed) => {
            let services_str = renewed
                .iter()
                .map(|s| {
                    format!(
                        "{} (new expiry {})",
                        s.service_name,
                        s.new_expiry.date_naive()
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            (
                "accepted",
                format!(
                    "Action {} accepted. The following services were renewed: {}.",
                    payload.action_id, services_str
                ),
            )
        }
        ConfirmOutcome::NothingToRenew => (
            "accepted",
            format!(
                "Action {} accepted, but no expiring services were found to renew.",
                payload.action_id
            ),
        ),
        ConfirmOutcome::Rejected => (
            "rejected",
            format!("Action {} rejected by user.", payload.action_id),
        ),
    };

    tracing::info!(
        session_id = %payload.user_id,
        action_id = %payload.action_id,
        status,
        "Confirm-action processed"
    );

    Ok(Json(ConfirmActionResponse {
        status: status.to_string(),
        detail,
    }))
}
