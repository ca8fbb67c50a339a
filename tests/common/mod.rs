// SPDX-License-Identifier: MIT

use absher_agent::config::Config;
use absher_agent::models::{ServiceKind, ServiceRecord, SessionUser};
use absher_agent::routes::create_router;
use absher_agent::services::{
    ChatAgent, DocIndex, MessageComposer, OpenAiClient, ProactiveScanner, RenewalService,
};
use absher_agent::store::{MemoryStore, SessionStore, TemplateRegistry};
use absher_agent::AppState;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Build a test app state around a given OpenAI client (usually a mock).
#[allow(dead_code)]
pub fn test_state_with(openai: OpenAiClient) -> Arc<AppState> {
    let config = Config::test_default();
    let templates =
        TemplateRegistry::load_from_json(&template_json()).expect("test templates should parse");
    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());

    let composer = MessageComposer::new(openai.clone(), config.notification_model.clone());
    let renewal = RenewalService::new(store.clone(), config.expiry_threshold_days);
    let scanner = Arc::new(ProactiveScanner::new(
        store.clone(),
        composer.clone(),
        config.expiry_threshold_days,
        config.reminder_dedup_days,
    ));
    let agent = ChatAgent::new(
        openai.clone(),
        DocIndex::default(),
        renewal.clone(),
        config.chat_model.clone(),
        config.expiry_threshold_days,
    );

    Arc::new(AppState {
        config,
        store,
        templates,
        openai,
        composer,
        renewal,
        scanner,
        agent,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state_with(OpenAiClient::new_mock());
    (create_router(state.clone()), state)
}

/// Register a session user with the given services directly in the store.
#[allow(dead_code)]
pub fn seed_session(
    state: &AppState,
    services: &[(ServiceKind, Option<DateTime<Utc>>)],
) -> String {
    let user = SessionUser {
        national_id: "1000000099".to_string(),
        name: "Seeded User".to_string(),
        phone_number: "+966500000099".to_string(),
        services: services
            .iter()
            .map(|(kind, expiry)| ServiceRecord::new(*kind, *expiry))
            .collect(),
    };
    state.store.create_session(user)
}

/// Template data with a driver license expiring in 2 days, generated
/// relative to the test run.
#[allow(dead_code)]
fn template_json() -> String {
    let expiring = (Utc::now() + Duration::days(2)).to_rfc3339();
    let valid = (Utc::now() + Duration::days(300)).to_rfc3339();
    format!(
        r#"[
            {{
                "national_id": "1098765432",
                "username": "ahmad",
                "password": "demo123",
                "name": "Ahmad Al-Qahtani",
                "phone_number": "+966500000001",
                "services": [
                    {{
                        "service_type": "driver_license",
                        "service_name": "Driver License",
                        "expiry_date": "{expiring}"
                    }},
                    {{
                        "service_type": "national_id",
                        "service_name": "National ID",
                        "expiry_date": "{valid}"
                    }}
                ]
            }}
        ]"#
    )
}
