use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_FALLBACK_MODEL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Primary model identifier. Static configuration — models are never
    /// discovered by scanning the provider's capability list.
    pub advisor_model: String,
    /// Tried only when the primary fails its startup health check.
    pub advisor_fallback_model: String,
    pub max_sessions: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            advisor_model: std::env::var("ADVISOR_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            advisor_fallback_model: std::env::var("ADVISOR_FALLBACK_MODEL")
                .unwrap_or_else(|_| DEFAULT_FALLBACK_MODEL.to_string()),
            max_sessions: std::env::var("MAX_SESSIONS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse::<usize>()
                .context("MAX_SESSIONS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
