use crate::model::ActivityEvent;

/// Merges per-endpoint event streams into one timeline: newest first, ties
/// broken by kind precedence (commit, then pull request, then issue) and
/// then repository name, so identical inputs always produce identical
/// output. Materializes everything; global order needs full visibility.
pub fn aggregate(streams: Vec<Vec<ActivityEvent>>) -> Vec<ActivityEvent> {
    let mut events: Vec<ActivityEvent> = streams.into_iter().flatten().collect();
    events.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.repository.cmp(&b.repository))
    });
    events
}
