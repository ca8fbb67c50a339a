//! Application configuration loaded from environment variables.
//!
//! The OpenAI key is the only secret; it is read once at startup and kept
//! in memory for the process lifetime.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS.
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Path to the template users JSON file.
    pub users_path: String,
    /// Path to the Absher documentation JSON file (agent RAG tool).
    pub docs_path: String,
    /// Model used by the chat agent.
    pub chat_model: String,
    /// Model used for notification/SMS text.
    pub notification_model: String,
    /// Services expiring within this many days are eligible for renewal
    /// and trigger proactive SMS reminders.
    pub expiry_threshold_days: i64,
    /// At most one SMS reminder per service within this window.
    pub reminder_dedup_days: i64,
    /// Interval between periodic proactive sweeps.
    pub proactive_interval_secs: u64,
    /// Timeout for outbound OpenAI calls.
    pub openai_timeout_secs: u64,

    // --- Secrets ---
    /// OpenAI API key.
    pub openai_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            users_path: env::var("USERS_PATH").unwrap_or_else(|_| "data/users.json".to_string()),
            docs_path: env::var("DOCS_PATH")
                .unwrap_or_else(|_| "data/absher_docs.json".to_string()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            notification_model: env::var("NOTIFICATION_MODEL")
                .unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            expiry_threshold_days: parse_env_or("EXPIRY_THRESHOLD_DAYS", 3),
            reminder_dedup_days: parse_env_or("REMINDER_DEDUP_DAYS", 7),
            proactive_interval_secs: parse_env_or("PROACTIVE_INTERVAL_SECS", 600),
            openai_timeout_secs: parse_env_or("OPENAI_TIMEOUT_SECS", 30),

            openai_api_key: env::var("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("OPENAI_API_KEY"))?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8000,
            users_path: "data/users.json".to_string(),
            docs_path: "data/absher_docs.json".to_string(),
            chat_model: "gpt-4.1-mini".to_string(),
            notification_model: "gpt-4.1-mini".to_string(),
            expiry_threshold_days: 3,
            reminder_dedup_days: 7,
            proactive_interval_secs: 600,
            openai_timeout_secs: 5,
            openai_api_key: "test-key".to_string(),
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("OPENAI_API_KEY", "test_key");
        env::set_var("PORT", "9000");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.openai_api_key, "test_key");
        assert_eq!(config.port, 9000);
        assert_eq!(config.expiry_threshold_days, 3);
        assert_eq!(config.reminder_dedup_days, 7);
    }
}
