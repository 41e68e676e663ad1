use anyhow::Context;
use console::style;
use tracing::{info, warn};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::github::{GithubClient, HttpTransport, Pages, Transport};
use crate::logging;
use crate::model::{parse_date, ActivityEvent, DateRange, EventKind, QueryParams};
use crate::normalize::normalize;

pub fn exec(cli: Cli) -> anyhow::Result<()> {
    // argument validation happens before config, logging, or any HTTP
    let range = DateRange::new(
        cli.start_date.as_deref().map(parse_date).transpose()?,
        cli.end_date.as_deref().map(parse_date).transpose()?,
    )?;
    let params = QueryParams {
        username: cli.username,
        organization: cli.org,
        range,
    };

    let config = Config::from_env()?;
    logging::init(&config.log_level, cli.log_file.as_deref())?;

    let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;
    let client = GithubClient::new(transport, &config);
    client
        .validate_credentials()
        .context("GitHub credential validation failed")?;

    info!(username = %params.username, org = ?params.organization, "fetching activity");
    let events = collect_events(&client, &params)?;
    info!(count = events.len(), "retrieved activity events");

    match cli.output_format {
        OutputFormat::Json => output_json(&events)?,
        OutputFormat::Pretty => output_pretty(&events),
    }

    Ok(())
}

/// Runs the full pipeline for every event kind in turn: paginate, normalize,
/// filter by date, then merge into one sorted timeline. Malformed records
/// are logged and skipped; anything else aborts the run.
pub fn collect_events<T: Transport>(
    client: &GithubClient<T>,
    params: &QueryParams,
) -> Result<Vec<ActivityEvent>> {
    let mut streams = Vec::with_capacity(EventKind::ALL.len());
    for kind in EventKind::ALL {
        let mut events = Vec::new();
        for record in Pages::new(client, kind, params) {
            match normalize(&record?) {
                Ok(event) => {
                    if params.range.contains(&event.timestamp) {
                        events.push(event);
                    }
                }
                Err(err) => warn!(%err, ?kind, "skipping malformed record"),
            }
        }
        info!(?kind, count = events.len(), "endpoint done");
        streams.push(events);
    }
    Ok(crate::aggregate::aggregate(streams))
}

fn output_json(events: &[ActivityEvent]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(events)?);
    Ok(())
}

fn output_pretty(events: &[ActivityEvent]) {
    if events.is_empty() {
        println!("{}", style("No activity found.").dim());
        return;
    }
    for event in events {
        println!(
            "{}",
            style(event.timestamp.format("%Y-%m-%d %H:%M:%S")).blue().bold()
        );
        println!(
            "{} {}: {}",
            style(event.kind.label()).bold(),
            event.repository,
            event.title
        );
        println!("{}", style(&event.url).dim());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{RateLimitState, TransportError, TransportResponse};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    /// Routes requests by URL substring; unmatched URLs get an empty page.
    struct RoutedTransport {
        routes: Vec<(&'static str, serde_json::Value)>,
    }

    impl Transport for RoutedTransport {
        fn get(&self, url: &str) -> std::result::Result<TransportResponse, TransportError> {
            let items = self
                .routes
                .iter()
                .find(|(needle, _)| url.contains(needle))
                .map(|(_, items)| items.clone())
                .unwrap_or_else(|| json!([]));
            Ok(TransportResponse {
                status: 200,
                body: json!({ "items": items }),
                rate_limit: RateLimitState::default(),
                next: None,
            })
        }
    }

    fn client(routes: Vec<(&'static str, serde_json::Value)>) -> GithubClient<RoutedTransport> {
        let config = Config {
            token: "t".to_string(),
            log_level: "INFO".to_string(),
            retry_total: 0,
            retry_backoff: Duration::from_millis(1),
            http_timeout: Duration::from_secs(1),
        };
        GithubClient::new(RoutedTransport { routes }, &config)
    }

    fn params(range: DateRange) -> QueryParams {
        QueryParams {
            username: "alice".to_string(),
            organization: Some("acme".to_string()),
            range,
        }
    }

    fn commit_item(date: &str, sha: &str) -> serde_json::Value {
        json!({
            "commit": { "message": format!("commit {sha}"), "author": { "date": date } },
            "repository": { "full_name": "acme/widgets" },
            "html_url": format!("https://github.com/acme/widgets/commit/{sha}")
        })
    }

    fn pr_item(date: &str, number: u32) -> serde_json::Value {
        json!({
            "title": format!("PR #{number}"),
            "created_at": date,
            "html_url": format!("https://github.com/acme/widgets/pull/{number}"),
            "repository_url": "https://api.github.com/repos/acme/widgets"
        })
    }

    #[test]
    fn two_commits_one_pr_no_issues_yields_three_sorted_events() {
        let client = client(vec![
            (
                "search/commits",
                json!([
                    commit_item("2024-02-18T10:00:00Z", "aaa"),
                    commit_item("2024-02-20T10:00:00Z", "bbb"),
                ]),
            ),
            ("type:pr", json!([pr_item("2024-02-19T10:00:00Z", 7)])),
            ("type:issue", json!([])),
        ]);

        let events = collect_events(&client, &params(DateRange::default())).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, EventKind::Commit);
        assert_eq!(events[0].title, "commit bbb");
        assert_eq!(events[1].kind, EventKind::PullRequest);
        assert_eq!(events[2].kind, EventKind::Commit);
        assert_eq!(events[2].title, "commit aaa");
    }

    #[test]
    fn events_outside_the_range_are_dropped() {
        let client = client(vec![(
            "search/commits",
            json!([
                commit_item("2024-02-01T00:00:00Z", "in-lo"),
                commit_item("2024-02-15T12:00:00Z", "in-mid"),
                commit_item("2024-02-28T23:59:59Z", "in-hi"),
                commit_item("2024-01-31T23:59:59Z", "out-lo"),
                commit_item("2024-03-01T00:00:00Z", "out-hi"),
            ]),
        )]);

        let range = DateRange::new(
            Some(parse_date("2024-02-01").unwrap()),
            Some(parse_date("2024-02-28").unwrap()),
        )
        .unwrap();
        let events = collect_events(&client, &params(range)).unwrap();

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["commit in-hi", "commit in-mid", "commit in-lo"]);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let client = client(vec![(
            "search/commits",
            json!([
                json!({ "unexpected": true }),
                commit_item("2024-02-20T10:00:00Z", "ok"),
            ]),
        )]);

        let events = collect_events(&client, &params(DateRange::default())).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "commit ok");
    }

    #[test]
    fn zero_results_is_a_valid_empty_timeline() {
        let client = client(vec![]);
        let events = collect_events(&client, &params(DateRange::default())).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn identical_runs_produce_byte_identical_json() {
        let routes = || {
            vec![
                (
                    "search/commits",
                    json!([commit_item("2024-02-20T10:00:00Z", "aaa")]),
                ),
                ("type:pr", json!([pr_item("2024-02-20T10:00:00Z", 7)])),
            ]
        };
        let first = serde_json::to_vec(
            &collect_events(&client(routes()), &params(DateRange::default())).unwrap(),
        )
        .unwrap();
        let second = serde_json::to_vec(
            &collect_events(&client(routes()), &params(DateRange::default())).unwrap(),
        )
        .unwrap();
        assert_eq!(first, second);
    }
}
