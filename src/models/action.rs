// SPDX-License-Identifier: MIT

//! Proposed actions returned by the chat agent for explicit confirmation.

use crate::models::service::ServiceKind;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Structured payload of a proposed action.
///
/// The amount is always computed server-side from the fee table; the client
/// only ever echoes it for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct ActionData {
    /// Target service kind; `None` when the agent named a service outside
    /// the closed set (the default fee applies).
    pub service_type: Option<ServiceKind>,
    pub requires_payment: bool,
    pub amount: f64,
    pub currency: String,
}

/// An ephemeral renewal proposal shown to the user for confirmation.
///
/// Returned by the propose step and echoed back on `/confirm-action`.
/// The confirm step is authorized by session id + service kind; the action
/// id is cross-checked against the proposal registry when still live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct ProposedAction {
    pub id: String,
    /// Action type tag, e.g. "renew_driver_license".
    #[serde(rename = "type")]
    pub action_type: String,
    /// Human description for the confirmation popup.
    pub description: String,
    pub data: ActionData,
}
