// SPDX-License-Identifier: MIT

//! Absher Proactive Agent API Server
//!
//! Lets demo users chat with an LLM-backed assistant about their Absher
//! services, confirms renewals through an explicit two-phase handshake, and
//! sends proactive expiry reminders.

use absher_agent::{
    config::Config,
    services::{
        scanner::spawn_periodic, ChatAgent, DocIndex, MessageComposer, OpenAiClient,
        ProactiveScanner, RenewalService,
    },
    store::{MemoryStore, SessionStore, TemplateRegistry},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Absher agent API");

    // Template identities; the server never runs without a usable set.
    let templates = TemplateRegistry::load_from_file(&config.users_path)
        .expect("Failed to load template users");

    let docs = DocIndex::load_from_file(&config.docs_path);

    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());

    let openai = OpenAiClient::new(
        config.openai_api_key.clone(),
        Duration::from_secs(config.openai_timeout_secs),
    );
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
        docs,
        renewal.clone(),
        config.chat_model.clone(),
        config.expiry_threshold_days,
    );

    // Periodic proactive sweep, detached from request handling.
    let _sweep_task = spawn_periodic(
        scanner.clone(),
        Duration::from_secs(config.proactive_interval_secs),
    );
    tracing::info!(
        interval_secs = config.proactive_interval_secs,
        "Proactive scheduler started"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        templates,
        openai,
        composer,
        renewal,
        scanner,
        agent,
    });

    // Build router
    let app = absher_agent::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("absher_agent=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
