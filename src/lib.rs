// SPDX-License-Identifier: MIT

//! Absher proactive agent backend.
//!
//! This crate provides the backend API for the Absher assistant demo:
//! template-user login with per-session cloning, an LLM chat agent that
//! proposes renewal actions, the propose→confirm renewal workflow, and
//! proactive expiry reminders.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use services::{ChatAgent, MessageComposer, OpenAiClient, ProactiveScanner, RenewalService};
use std::sync::Arc;
use store::{SessionStore, TemplateRegistry};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SessionStore>,
    pub templates: TemplateRegistry,
    pub openai: OpenAiClient,
    pub composer: MessageComposer,
    pub renewal: RenewalService,
    pub scanner: Arc<ProactiveScanner>,
    pub agent: ChatAgent,
}
