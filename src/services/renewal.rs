// SPDX-License-Identifier: MIT

//! Renewal workflow: propose → confirm → apply.
//!
//! Propose computes the official fee and hands back a value object for the
//! confirmation popup; nothing is mutated until the user explicitly accepts,
//! and eligibility + fee are recomputed server-side at confirm time. A
//! client can therefore neither dictate an amount nor replay a stale
//! proposal after the service was already renewed.

use crate::error::{AppError, Result};
use crate::models::{ActionData, ProposedAction, ServiceKind};
use crate::services::expiry;
use crate::services::fees;
use crate::store::SessionStore;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// How long a recorded proposal stays live for confirm-time cross-checks.
const PROPOSAL_TTL_MINUTES: i64 = 10;

/// A successful renewal extends the expiry by one year from
/// `max(now, old_expiry)`.
const RENEWAL_EXTENSION_DAYS: i64 = 365;

/// A recorded propose step, kept briefly so confirm can cross-check the
/// echoed action id.
#[derive(Debug, Clone)]
struct Proposal {
    session_id: String,
    service_type: Option<ServiceKind>,
    created_at: DateTime<Utc>,
}

impl Proposal {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < Duration::minutes(PROPOSAL_TTL_MINUTES)
    }
}

/// One service renewed by a confirm-accept.
#[derive(Debug, Clone)]
pub struct RenewedService {
    pub service_type: ServiceKind,
    pub service_name: String,
    pub new_expiry: DateTime<Utc>,
}

/// Outcome of the confirm step.
///
/// `NothingToRenew` is a successful no-op, not an error: the service was no
/// longer `EXPIRED`/`EXPIRING` when the user confirmed.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    Renewed(Vec<RenewedService>),
    NothingToRenew,
    Rejected,
}

/// The propose → confirm → apply state machine.
#[derive(Clone)]
pub struct RenewalService {
    store: Arc<dyn SessionStore>,
    proposals: Arc<DashMap<String, Proposal>>,
    threshold_days: i64,
}

impl RenewalService {
    pub fn new(store: Arc<dyn SessionStore>, threshold_days: i64) -> Self {
        Self {
            store,
            proposals: Arc::new(DashMap::new()),
            threshold_days,
        }
    }

    /// Propose step: build the action the user will be asked to confirm.
    ///
    /// `service_label` is whatever the agent signaled; labels outside the
    /// closed kind set get the default fee. No mutation happens here.
    pub fn propose(
        &self,
        session_id: &str,
        service_label: &str,
        reason: Option<&str>,
    ) -> Result<ProposedAction> {
        // Validates the session exists; the snapshot itself is not needed.
        let _ = self.store.get_session(session_id)?;

        let service_type = service_label.parse::<ServiceKind>().ok();
        let amount = fees::fee_for_label(service_label);

        let description = match (reason, service_type) {
            (Some(r), _) => r.to_string(),
            (None, Some(kind)) => format!("Renew your {}.", kind.label()),
            (None, None) => "Renew the selected service.".to_string(),
        };

        let action_type = match service_type {
            Some(kind) => format!("renew_{kind}"),
            None => "renew_unknown".to_string(),
        };

        let action = ProposedAction {
            id: uuid::Uuid::new_v4().to_string(),
            action_type,
            description,
            data: ActionData {
                service_type,
                requires_payment: true,
                amount,
                currency: fees::CURRENCY.to_string(),
            },
        };

        self.record_proposal(&action.id, session_id, service_type);

        tracing::info!(
            session_id = %session_id,
            action_id = %action.id,
            service = %service_label,
            amount,
            "Proposed renewal action"
        );
        Ok(action)
    }

    /// Confirm step. Re-validates eligibility from live state; the apply
    /// step advances the expiry to `max(now, old_expiry) + 365 days`.
    pub fn confirm(
        &self,
        session_id: &str,
        action_id: &str,
        service_type: Option<ServiceKind>,
        accepted: bool,
    ) -> Result<ConfirmOutcome> {
        let user = self.store.get_session(session_id)?;
        let recorded = self.take_proposal(action_id, session_id)?;

        if !accepted {
            tracing::info!(session_id = %session_id, action_id = %action_id, "Renewal rejected by user");
            return Ok(ConfirmOutcome::Rejected);
        }

        // Target resolution: explicit request field wins, then the recorded
        // proposal; with neither, every expiring service is fair game (the
        // original demo contract). A live proposal naming a different
        // service than the request is a confused client.
        let target = match (service_type, recorded.flatten()) {
            (Some(requested), Some(proposed)) if requested != proposed => {
                return Err(AppError::BadRequest(format!(
                    "Action {action_id} proposed {proposed}, not {requested}"
                )));
            }
            (Some(requested), _) => Some(requested),
            (None, proposed) => proposed,
        };

        let now = Utc::now();
        let mut renewed = Vec::new();

        for service in user.tracked_services() {
            if target.is_some_and(|kind| kind != service.service_type) {
                continue;
            }
            let Some(old_expiry) = service.expiry_date else {
                continue;
            };

            // Eligibility is recomputed here, at confirm time.
            let status = expiry::classify(old_expiry, now, self.threshold_days);
            if !status.is_renewable() {
                continue;
            }

            let base = old_expiry.max(now);
            let new_expiry = base + Duration::days(RENEWAL_EXTENSION_DAYS);
            self.store
                .set_service_expiry(session_id, service.service_type, new_expiry)?;

            tracing::info!(
                session_id = %session_id,
                service = %service.service_type,
                new_expiry = %new_expiry,
                "Service renewed"
            );
            renewed.push(RenewedService {
                service_type: service.service_type,
                service_name: service.service_name.clone(),
                new_expiry,
            });
        }

        if renewed.is_empty() {
            Ok(ConfirmOutcome::NothingToRenew)
        } else {
            Ok(ConfirmOutcome::Renewed(renewed))
        }
    }

    fn record_proposal(
        &self,
        action_id: &str,
        session_id: &str,
        service_type: Option<ServiceKind>,
    ) {
        let now = Utc::now();
        self.proposals.retain(|_, p| p.is_live(now));
        self.proposals.insert(
            action_id.to_string(),
            Proposal {
                session_id: session_id.to_string(),
                service_type,
                created_at: now,
            },
        );
    }

    /// Consume the recorded proposal for an action id, if one is still live.
    ///
    /// Unknown or expired ids are tolerated (`Ok(None)`) — authorization is
    /// session + service kind — but an id recorded for a different session
    /// is rejected outright.
    fn take_proposal(
        &self,
        action_id: &str,
        session_id: &str,
    ) -> Result<Option<Option<ServiceKind>>> {
        let Some((_, proposal)) = self.proposals.remove(action_id) else {
            return Ok(None);
        };
        if proposal.session_id != session_id {
            return Err(AppError::BadRequest(format!(
                "Action {action_id} does not belong to this session"
            )));
        }
        if !proposal.is_live(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(proposal.service_type))
    }
}
