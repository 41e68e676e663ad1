use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{GactError, Result};

pub const DEFAULT_LOG_LEVEL: &str = "INFO";
const DEFAULT_RETRY_TOTAL: u32 = 0;
const DEFAULT_RETRY_BACKOFF_SECS: f64 = 0.1;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Immutable runtime configuration, built once at startup from the
/// environment and passed explicitly to every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub log_level: String,
    pub retry_total: u32,
    pub retry_backoff: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                GactError::Auth("GITHUB_TOKEN is not set; a GitHub token is required".to_string())
            })?;

        let log_level =
            env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let retry_total = env_parse("GITHUB_RETRY_TOTAL", DEFAULT_RETRY_TOTAL)?;
        let backoff_secs: f64 = env_parse("GITHUB_RETRY_BACKOFF", DEFAULT_RETRY_BACKOFF_SECS)?;
        if !backoff_secs.is_finite() || backoff_secs < 0.0 {
            return Err(GactError::Parse(format!(
                "invalid GITHUB_RETRY_BACKOFF: {backoff_secs} is not a non-negative duration"
            )));
        }
        let timeout_secs = env_parse("GITHUB_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            token,
            log_level,
            retry_total,
            retry_backoff: Duration::from_secs_f64(backoff_secs),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| GactError::Parse(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
