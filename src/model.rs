use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{GactError, Result};

/// Tie-break precedence for equal timestamps follows the variant order:
/// commits sort before pull requests, pull requests before issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Commit,
    PullRequest,
    Issue,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Commit, EventKind::PullRequest, EventKind::Issue];

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Commit => "commit",
            EventKind::PullRequest => "pull request",
            EventKind::Issue => "issue",
        }
    }
}

/// One normalized activity record. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub repository: String,
    pub title: String,
    pub url: String,
}

/// Raw API record tagged with the endpoint kind that produced it.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub kind: EventKind,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct QueryParams {
    pub username: String,
    pub organization: Option<String>,
    pub range: DateRange,
}

/// Inclusive calendar-date window; an absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(GactError::InvalidDate(format!(
                    "start date {s} is after end date {e}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| GactError::InvalidDate(format!("expected YYYY-MM-DD, got {input:?}")))
}
