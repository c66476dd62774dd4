use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_LLM_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;

/// Application configuration loaded from environment variables.
/// Fails at startup only if `DATABASE_URL` is missing or `PORT` is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm: LlmConfig,
    pub jd_fetch_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

/// Settings for the OpenAI-compatible chat completion endpoint.
///
/// `api_key` is optional here: a missing key is reported by the LLM call itself,
/// so the service can still serve history and extraction without credentials.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            llm: LlmConfig {
                api_key: optional_env("OPENAI_API_KEY"),
                base_url: optional_env("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: optional_env("OPENAI_MODEL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                temperature: optional_env("OPENAI_TEMPERATURE")
                    .and_then(|v| v.parse::<f32>().ok())
                    .unwrap_or(DEFAULT_TEMPERATURE),
                timeout: millis_or_default(
                    optional_env("OPENAI_TIMEOUT_MS").as_deref(),
                    DEFAULT_LLM_TIMEOUT_MS,
                ),
            },
            jd_fetch_timeout: millis_or_default(
                optional_env("JD_FETCH_TIMEOUT_MS").as_deref(),
                DEFAULT_FETCH_TIMEOUT_MS,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_millis(DEFAULT_LLM_TIMEOUT_MS),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable only when it is set to a non-blank value.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Unparseable or zero timeouts fall back to the default.
fn millis_or_default(raw: Option<&str>, default_ms: u64) -> Duration {
    let ms = raw
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}
