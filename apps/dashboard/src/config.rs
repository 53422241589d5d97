use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the semantic-search service (`POST {url}/search`).
    pub search_service_url: String,
    /// Base URL of the call service (`POST {url}/create-call`, `POST {url}/call-status`).
    pub call_service_url: String,
    /// Phone number the call service dials on behalf of the recruiter.
    pub call_user_phone: String,
    pub search_result_limit: u32,
    pub search_threshold: Option<f64>,
    pub request_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            search_service_url: require_env("SEARCH_SERVICE_URL")?,
            call_service_url: require_env("CALL_SERVICE_URL")?,
            call_user_phone: require_env("CALL_USER_PHONE")?,
            search_result_limit: parse_env("SEARCH_RESULT_LIMIT", 10)?,
            search_threshold: match std::env::var("SEARCH_THRESHOLD") {
                Ok(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
                Ok(raw) => Some(
                    raw.trim()
                        .parse::<f64>()
                        .context("SEARCH_THRESHOLD must be a number or 'none'")?,
                ),
                Err(_) => Some(0.7),
            },
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}
