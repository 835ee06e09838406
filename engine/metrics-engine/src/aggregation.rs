//! Counts-by-kind over a recent window.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use event_store::EventStore;

/// Caller-contract errors for metric queries.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    /// The requested window reaches further back than the store retains.
    /// Surfaced rather than clamped.
    #[error("query window exceeds the store retention period")]
    WindowExceedsRetention,
}

/// Count retained events per kind with `created_at >= since`.
///
/// Every allowed kind appears in the result, zero-filled when nothing
/// matched. Kinds outside the allowed set never reach the store, so the
/// tally iterates the window subset only.
pub fn count_events_by_kind(
    store: &EventStore,
    since: DateTime<Utc>,
    allowed_kinds: &HashSet<String>,
) -> Result<HashMap<String, u64>, MetricsError> {
    // One second of slack so a caller asking for exactly the full retention
    // window is not rejected by the clock moving between its read and ours.
    if since < Utc::now() - store.retention() - Duration::seconds(1) {
        return Err(MetricsError::WindowExceedsRetention);
    }

    let mut counts: HashMap<String, u64> =
        allowed_kinds.iter().map(|kind| (kind.clone(), 0)).collect();
    for event in store.recent_since(since) {
        *counts.entry(event.kind).or_insert(0) += 1;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use event_store::{EventRecord, StoreConfig};

    fn allowed() -> HashSet<String> {
        ["WatchEvent", "PullRequestEvent", "IssuesEvent"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn store_with(events: Vec<EventRecord>) -> EventStore {
        let store = EventStore::new(StoreConfig::default()).unwrap();
        store.add_events(events);
        store
    }

    #[test]
    fn test_counts_and_zero_fills_allowed_kinds() {
        let base = Utc::now();
        let store = store_with(vec![
            EventRecord::new("pr1", "PullRequestEvent", "alice/repo", base + Duration::minutes(1)),
            EventRecord::new("iss1", "IssuesEvent", "alice/repo", base + Duration::minutes(2)),
            EventRecord::new("pr2", "PullRequestEvent", "alice/repo", base + Duration::minutes(3)),
            // Before the cutoff: retained, but outside the counted window.
            EventRecord::new("watch0", "WatchEvent", "alice/repo", base - Duration::days(1)),
        ]);

        let counts = count_events_by_kind(&store, base, &allowed()).unwrap();

        assert_eq!(counts["PullRequestEvent"], 2);
        assert_eq!(counts["IssuesEvent"], 1);
        assert_eq!(counts["WatchEvent"], 0);
    }

    #[test]
    fn test_empty_window_is_all_zeroes_not_an_error() {
        let store = store_with(vec![]);

        let counts = count_events_by_kind(&store, Utc::now(), &allowed()).unwrap();

        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&count| count == 0));
    }

    #[test]
    fn test_window_wider_than_retention_is_rejected() {
        let store = store_with(vec![]);
        let too_far_back = Utc::now() - store.retention() - Duration::minutes(5);

        let result = count_events_by_kind(&store, too_far_back, &allowed());

        assert_eq!(result, Err(MetricsError::WindowExceedsRetention));
    }

    #[test]
    fn test_full_retention_window_is_allowed() {
        let store = store_with(vec![]);
        let full_window = Utc::now() - store.retention();

        assert!(count_events_by_kind(&store, full_window, &allowed()).is_ok());
    }

    #[test]
    fn test_is_deterministic_without_mutation() {
        let base = Utc::now();
        let store = store_with(vec![
            EventRecord::new("1", "WatchEvent", "alice/repo", base),
            EventRecord::new("2", "IssuesEvent", "bob/tool", base),
        ]);
        let since = base - Duration::minutes(10);

        let first = count_events_by_kind(&store, since, &allowed()).unwrap();
        let second = count_events_by_kind(&store, since, &allowed()).unwrap();

        assert_eq!(first, second);
    }
}
