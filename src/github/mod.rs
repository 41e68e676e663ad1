pub mod client;
pub mod pages;

pub use client::{GithubClient, HttpTransport, Page, RateLimitState, Transport, TransportError, TransportResponse};
pub use pages::Pages;

use crate::model::{EventKind, QueryParams};

pub const API_ROOT: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

/// First-page search URL for one event kind. Subsequent pages come from the
/// `Link: rel="next"` header, not from this builder.
pub fn search_url(kind: EventKind, params: &QueryParams) -> String {
    let mut query = match kind {
        EventKind::Commit => format!("author:{}", params.username),
        EventKind::PullRequest => format!("type:pr+author:{}", params.username),
        EventKind::Issue => format!("type:issue+author:{}", params.username),
    };
    if let Some(org) = &params.organization {
        query.push_str("+org:");
        query.push_str(org);
    }
    let endpoint = match kind {
        EventKind::Commit => "search/commits",
        EventKind::PullRequest | EventKind::Issue => "search/issues",
    };
    format!("{API_ROOT}/{endpoint}?q={query}&per_page={PER_PAGE}")
}

pub fn user_url() -> String {
    format!("{API_ROOT}/user")
}
