use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{GactError, Result};
use crate::model::{ActivityEvent, EventKind, RawRecord};

const REPOS_PREFIX: &str = "/repos/";

/// Converts one raw search record into the unified event shape. The kind is
/// taken from the record's endpoint tag, never inferred from its content.
pub fn normalize(record: &RawRecord) -> Result<ActivityEvent> {
    match record.kind {
        EventKind::Commit => normalize_commit(&record.value),
        EventKind::PullRequest | EventKind::Issue => {
            normalize_issue_like(record.kind, &record.value)
        }
    }
}

fn normalize_commit(value: &Value) -> Result<ActivityEvent> {
    // commits authored via the web UI sometimes lack an author date
    let date = str_at(value, &["commit", "author", "date"])
        .or_else(|_| str_at(value, &["commit", "committer", "date"]))?;
    let message = str_at(value, &["commit", "message"])?;
    let title = message.lines().next().unwrap_or_default().to_string();

    Ok(ActivityEvent {
        timestamp: parse_timestamp(date)?,
        kind: EventKind::Commit,
        repository: str_at(value, &["repository", "full_name"])?.to_string(),
        title,
        url: str_at(value, &["html_url"])?.to_string(),
    })
}

fn normalize_issue_like(kind: EventKind, value: &Value) -> Result<ActivityEvent> {
    let repository_url = str_at(value, &["repository_url"])?;
    let repository = repository_url
        .split_once(REPOS_PREFIX)
        .map(|(_, rest)| rest.to_string())
        .ok_or_else(|| {
            GactError::MalformedRecord(format!(
                "repository_url {repository_url:?} has no {REPOS_PREFIX} segment"
            ))
        })?;

    Ok(ActivityEvent {
        timestamp: parse_timestamp(str_at(value, &["created_at"])?)?,
        kind,
        repository,
        title: str_at(value, &["title"])?.to_string(),
        url: str_at(value, &["html_url"])?.to_string(),
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| GactError::MalformedRecord(format!("bad timestamp {raw:?}")))
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str> {
    let mut current = value;
    for key in path {
        current = current
            .get(key)
            .ok_or_else(|| GactError::MalformedRecord(format!("missing field {}", path.join("."))))?;
    }
    current
        .as_str()
        .ok_or_else(|| GactError::MalformedRecord(format!("field {} is not a string", path.join("."))))
}
