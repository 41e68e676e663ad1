use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GactError>;

#[derive(Error, Debug)]
pub enum GactError {
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("GitHub API rate limit exceeded; resets at {reset}")]
    RateLimitExceeded { reset: DateTime<Utc> },
    #[error("Fetch error: {0}")]
    Fetch(String),
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
