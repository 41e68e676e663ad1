use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{GactError, Result};

/// Transport-level failure (connect, timeout, body read). Always considered
/// transient by the retry policy.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

/// One raw HTTP exchange as seen by the retry policy.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: serde_json::Value,
    pub rate_limit: RateLimitState,
    pub next: Option<String>,
}

/// Seam between the retry/rate-limit policy and the actual HTTP stack.
pub trait Transport {
    fn get(&self, url: &str) -> std::result::Result<TransportResponse, TransportError>;
}

/// Per-response rate-limit headers. Not persisted across requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitState {
    pub remaining: Option<u32>,
    pub reset: Option<i64>,
}

impl RateLimitState {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_value(headers, "x-ratelimit-remaining"),
            reset: header_value(headers, "x-ratelimit-reset"),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn reset_time(&self) -> Option<DateTime<Utc>> {
        self.reset.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Successful page: parsed JSON body plus the next-page URL, if any.
#[derive(Debug, Clone)]
pub struct Page {
    pub body: serde_json::Value,
    pub next: Option<String>,
}

/// Production transport over a blocking reqwest client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    token: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("gact/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            token: config.token.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let rate_limit = RateLimitState::from_headers(response.headers());
        let next = next_link(response.headers());
        let body = if response.status().is_success() {
            response.json().map_err(|e| TransportError(e.to_string()))?
        } else {
            serde_json::Value::Null
        };

        Ok(TransportResponse {
            status,
            body,
            rate_limit,
            next,
        })
    }
}

/// Extracts the `rel="next"` target from a Link header, if present.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            Some(
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string(),
            )
        } else {
            None
        }
    })
}

/// Authenticated GET with retry/backoff and rate-limit handling.
///
/// Transient failures (5xx, transport errors) are retried up to
/// `retry_total` times with exponential backoff. 403/429 with an exhausted
/// rate limit sleeps until the advertised reset instead of backing off.
/// 401 and 404 are never retried.
pub struct GithubClient<T: Transport> {
    transport: T,
    retry_total: u32,
    retry_backoff: Duration,
}

impl<T: Transport> GithubClient<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            retry_total: config.retry_total,
            retry_backoff: config.retry_backoff,
        }
    }

    /// One GET to `/user` to surface a bad token before any activity
    /// endpoint is queried.
    pub fn validate_credentials(&self) -> Result<()> {
        self.get(&super::user_url()).map(|_| ())
    }

    pub fn get(&self, url: &str) -> Result<Page> {
        let mut attempt: u32 = 0;
        debug!(url, "fetching");
        loop {
            match self.transport.get(url) {
                Ok(resp) if (200..300).contains(&resp.status) => {
                    debug!(
                        url,
                        remaining = ?resp.rate_limit.remaining,
                        "rate limit remaining"
                    );
                    return Ok(Page {
                        body: resp.body,
                        next: resp.next,
                    });
                }
                Ok(resp) if resp.status == 401 => {
                    return Err(GactError::Auth(
                        "GitHub rejected the token (HTTP 401)".to_string(),
                    ));
                }
                Ok(resp) if resp.status == 404 => {
                    return Err(GactError::NotFound(url.to_string()));
                }
                Ok(resp)
                    if (resp.status == 403 || resp.status == 429)
                        && resp.rate_limit.is_exhausted() =>
                {
                    let reset = resp.rate_limit.reset_time().unwrap_or_else(Utc::now);
                    if attempt >= self.retry_total {
                        return Err(GactError::RateLimitExceeded { reset });
                    }
                    let wait = (reset - Utc::now()).to_std().unwrap_or_default();
                    warn!(url, %reset, wait_secs = wait.as_secs(), "rate limit exhausted, waiting for reset");
                    thread::sleep(wait);
                }
                Ok(resp) if resp.status >= 500 => {
                    if attempt >= self.retry_total {
                        return Err(GactError::Fetch(format!(
                            "GET {url} failed with HTTP {} after {} attempt(s)",
                            resp.status,
                            attempt + 1
                        )));
                    }
                    warn!(url, status = resp.status, attempt, "transient server error, retrying");
                    self.backoff(attempt);
                }
                Ok(resp) => {
                    return Err(GactError::Fetch(format!(
                        "GET {url} returned HTTP {}",
                        resp.status
                    )));
                }
                Err(err) => {
                    if attempt >= self.retry_total {
                        return Err(GactError::Fetch(format!("GET {url} failed: {err}")));
                    }
                    warn!(url, %err, attempt, "transport error, retrying");
                    self.backoff(attempt);
                }
            }
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) {
        // backoff, 2*backoff, 4*backoff, ... capped to avoid shift overflow
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        thread::sleep(self.retry_backoff.saturating_mul(factor));
    }
}
