use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;
use crate::rate_limit::RateLimitPolicy;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// When set, rate limits are kept in Redis instead of process memory.
    pub redis_url: Option<String>,
    pub llm: LlmSettings,
    pub rate_limit: RateLimitPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let timeout_secs: u64 = parse_or(get("LLM_TIMEOUT_SECS"), 60)
            .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;

        let mut llm = LlmSettings::new(require("OPENROUTER_API_KEY")?);
        llm.timeout = Duration::from_secs(timeout_secs);
        if let Some(model) = get("OPENROUTER_MODEL") {
            llm.model = model;
        }
        if let Some(base_url) = get("OPENROUTER_BASE_URL") {
            llm.base_url = base_url;
        }
        if let Some(app_url) = get("APP_URL") {
            llm.app_url = app_url;
        }
        if let Some(app_title) = get("APP_TITLE") {
            llm.app_title = app_title;
        }

        let defaults = RateLimitPolicy::default();
        let rate_limit = RateLimitPolicy {
            max_requests: parse_or(get("RATE_LIMIT_MAX_REQUESTS"), defaults.max_requests)
                .context("RATE_LIMIT_MAX_REQUESTS must be a number")?,
            window: Duration::from_secs(
                parse_or(get("RATE_LIMIT_WINDOW_SECS"), defaults.window.as_secs())
                    .context("RATE_LIMIT_WINDOW_SECS must be a number of seconds")?,
            ),
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: get("REDIS_URL"),
            llm,
            rate_limit,
            port: parse_or(get("PORT"), 8080).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => Ok(v.trim().parse::<T>()?),
        None => Ok(default),
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("redis", &self.redis_url.is_some())
            .field("model", &self.llm.model)
            .field("llm_base_url", &self.llm.base_url)
            .field("llm_timeout", &self.llm.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
