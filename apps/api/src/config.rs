use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub flush_interval_secs: u64,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// Optional JSON file overriding the default scoring constants.
    pub scoring_profile_path: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            flush_interval_secs: env_or("FLUSH_INTERVAL_SECS", "30")
                .parse::<u64>()
                .context("FLUSH_INTERVAL_SECS must be an integer")?,
            llm_temperature: env_or("LLM_TEMPERATURE", "0.7")
                .parse::<f32>()
                .context("LLM_TEMPERATURE must be a float")?,
            llm_max_tokens: env_or("LLM_MAX_TOKENS", "1024")
                .parse::<u32>()
                .context("LLM_MAX_TOKENS must be an integer")?,
            scoring_profile_path: std::env::var("SCORING_PROFILE_PATH")
                .ok()
                .map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
