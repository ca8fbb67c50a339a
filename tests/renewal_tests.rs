// SPDX-License-Identifier: MIT

//! Renewal workflow: propose → confirm → apply.

use absher_agent::error::AppError;
use absher_agent::models::ServiceKind;
use absher_agent::services::renewal::ConfirmOutcome;
use absher_agent::store::SessionStore;
use chrono::{Duration, Utc};

mod common;
use common::{seed_session, test_state_with};
use absher_agent::services::OpenAiClient;

fn renewed_services(outcome: ConfirmOutcome) -> Vec<ServiceKind> {
    match outcome {
        ConfirmOutcome::Renewed(list) => list.iter().map(|s| s.service_type).collect(),
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn test_confirm_extends_expiring_service_by_365_days_from_now() {
    let state = test_state_with(OpenAiClient::new_mock());
    // Expiring in 2 days, but with max(now, expiry) the base is the expiry
    // itself since it is still in the future.
    let old_expiry = Utc::now() + Duration::days(2);
    let session_id = seed_session(&state, &[(ServiceKind::DriverLicense, Some(old_expiry))]);

    let action = state
        .renewal
        .propose(&session_id, "driver_license", None)
        .expect("propose should succeed");
    assert_eq!(action.data.amount, 80.0);
    assert_eq!(action.data.currency, "SAR");

    let outcome = state
        .renewal
        .confirm(&session_id, &action.id, Some(ServiceKind::DriverLicense), true)
        .expect("confirm should succeed");

    let ConfirmOutcome::Renewed(renewed) = outcome else {
        panic!("expected a renewal");
    };
    assert_eq!(renewed.len(), 1);
    // Future expiry is the base: exactly old + 365 days.
    assert_eq!(renewed[0].new_expiry, old_expiry + Duration::days(365));

    let user = state.store.get_session(&session_id).unwrap();
    assert_eq!(
        user.service(ServiceKind::DriverLicense).unwrap().expiry_date,
        Some(old_expiry + Duration::days(365))
    );
}

#[tokio::test]
async fn test_confirm_on_expired_service_bases_on_now() {
    let state = test_state_with(OpenAiClient::new_mock());
    let old_expiry = Utc::now() - Duration::days(10);
    let session_id = seed_session(&state, &[(ServiceKind::Passport, Some(old_expiry))]);

    let before = Utc::now();
    let outcome = state
        .renewal
        .confirm(&session_id, "any-action", Some(ServiceKind::Passport), true)
        .unwrap();
    let after = Utc::now();

    let ConfirmOutcome::Renewed(renewed) = outcome else {
        panic!("expected a renewal");
    };
    // Base is "now": strictly greater than max(now_before, old_expiry) + 365d
    // minus clock skew of the call itself.
    let new_expiry = renewed[0].new_expiry;
    assert!(new_expiry >= before + Duration::days(365));
    assert!(new_expiry <= after + Duration::days(365));
    assert!(new_expiry > old_expiry + Duration::days(365));
}

#[tokio::test]
async fn test_valid_service_yields_noop_not_mutation() {
    let state = test_state_with(OpenAiClient::new_mock());
    let old_expiry = Utc::now() + Duration::days(200);
    let session_id = seed_session(&state, &[(ServiceKind::NationalId, Some(old_expiry))]);

    let outcome = state
        .renewal
        .confirm(&session_id, "a1", Some(ServiceKind::NationalId), true)
        .unwrap();
    assert!(matches!(outcome, ConfirmOutcome::NothingToRenew));

    let user = state.store.get_session(&session_id).unwrap();
    assert_eq!(
        user.service(ServiceKind::NationalId).unwrap().expiry_date,
        Some(old_expiry)
    );
}

#[tokio::test]
async fn test_second_confirm_is_noop_after_renewal() {
    let state = test_state_with(OpenAiClient::new_mock());
    let session_id = seed_session(
        &state,
        &[(ServiceKind::DriverLicense, Some(Utc::now() + Duration::days(2)))],
    );

    let first = state
        .renewal
        .confirm(&session_id, "a1", Some(ServiceKind::DriverLicense), true)
        .unwrap();
    assert_eq!(renewed_services(first), vec![ServiceKind::DriverLicense]);

    // The service is now VALID; eligibility is recomputed at confirm time.
    let second = state
        .renewal
        .confirm(&session_id, "a2", Some(ServiceKind::DriverLicense), true)
        .unwrap();
    assert!(matches!(second, ConfirmOutcome::NothingToRenew));
}

#[tokio::test]
async fn test_reject_never_mutates() {
    let state = test_state_with(OpenAiClient::new_mock());
    let old_expiry = Utc::now() + Duration::days(1);
    let session_id = seed_session(&state, &[(ServiceKind::Passport, Some(old_expiry))]);

    let outcome = state
        .renewal
        .confirm(&session_id, "a1", Some(ServiceKind::Passport), false)
        .unwrap();
    assert!(matches!(outcome, ConfirmOutcome::Rejected));

    let user = state.store.get_session(&session_id).unwrap();
    assert_eq!(
        user.service(ServiceKind::Passport).unwrap().expiry_date,
        Some(old_expiry)
    );
}

#[tokio::test]
async fn test_propose_fee_is_deterministic_and_defaults_for_unknown() {
    let state = test_state_with(OpenAiClient::new_mock());
    let session_id = seed_session(
        &state,
        &[(ServiceKind::Passport, Some(Utc::now() + Duration::days(1)))],
    );

    let first = state.renewal.propose(&session_id, "passport", None).unwrap();
    let second = state.renewal.propose(&session_id, "passport", None).unwrap();
    assert_eq!(first.data.amount, 164.0);
    assert_eq!(first.data.amount, second.data.amount);

    let unknown = state.renewal.propose(&session_id, "iqama", None).unwrap();
    assert_eq!(unknown.data.amount, 150.0);
    assert_eq!(unknown.data.service_type, None);
    assert_eq!(unknown.action_type, "renew_unknown");
}

#[tokio::test]
async fn test_propose_for_unknown_session_fails() {
    let state = test_state_with(OpenAiClient::new_mock());
    let err = state.renewal.propose("no-such-session", "passport", None);
    assert!(matches!(err, Err(AppError::UnknownSession(_))));
}

#[tokio::test]
async fn test_confirm_with_mismatched_service_is_bad_request() {
    let state = test_state_with(OpenAiClient::new_mock());
    let session_id = seed_session(
        &state,
        &[
            (ServiceKind::Passport, Some(Utc::now() + Duration::days(1))),
            (ServiceKind::DriverLicense, Some(Utc::now() + Duration::days(1))),
        ],
    );

    let action = state.renewal.propose(&session_id, "passport", None).unwrap();
    let err = state
        .renewal
        .confirm(&session_id, &action.id, Some(ServiceKind::DriverLicense), true);
    assert!(matches!(err, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_confirm_with_foreign_action_id_is_bad_request() {
    let state = test_state_with(OpenAiClient::new_mock());
    let owner = seed_session(
        &state,
        &[(ServiceKind::Passport, Some(Utc::now() + Duration::days(1)))],
    );
    let other = seed_session(
        &state,
        &[(ServiceKind::Passport, Some(Utc::now() + Duration::days(1)))],
    );

    let action = state.renewal.propose(&owner, "passport", None).unwrap();
    let err = state
        .renewal
        .confirm(&other, &action.id, Some(ServiceKind::Passport), true);
    assert!(matches!(err, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_confirm_resolves_target_from_recorded_proposal() {
    let state = test_state_with(OpenAiClient::new_mock());
    let session_id = seed_session(
        &state,
        &[
            (ServiceKind::Passport, Some(Utc::now() + Duration::days(1))),
            (ServiceKind::DriverLicense, Some(Utc::now() + Duration::days(1))),
        ],
    );

    let action = state.renewal.propose(&session_id, "passport", None).unwrap();
    let outcome = state
        .renewal
        .confirm(&session_id, &action.id, None, true)
        .unwrap();

    // Only the proposed service is renewed.
    assert_eq!(renewed_services(outcome), vec![ServiceKind::Passport]);
    let user = state.store.get_session(&session_id).unwrap();
    let license = user.service(ServiceKind::DriverLicense).unwrap();
    assert!(license.expiry_date.unwrap() < Utc::now() + Duration::days(30));
}

#[tokio::test]
async fn test_confirm_without_target_renews_all_expiring() {
    let state = test_state_with(OpenAiClient::new_mock());
    let session_id = seed_session(
        &state,
        &[
            (ServiceKind::Passport, Some(Utc::now() - Duration::days(5))),
            (ServiceKind::DriverLicense, Some(Utc::now() + Duration::days(2))),
            (ServiceKind::NationalId, Some(Utc::now() + Duration::days(300))),
            (ServiceKind::VehicleRegistration, None),
        ],
    );

    // Unknown action id, no explicit target: the original demo contract.
    let outcome = state
        .renewal
        .confirm(&session_id, "stale-action", None, true)
        .unwrap();

    let mut renewed = renewed_services(outcome);
    renewed.sort_by_key(|k| k.as_str());
    assert_eq!(
        renewed,
        vec![ServiceKind::DriverLicense, ServiceKind::Passport]
    );
}
