//! Average interval between pull-request events for one repository.

use serde::{Deserialize, Serialize};

use event_store::EventStore;

/// Kind tag used as the pull-request creation signal.
///
/// The record model does not retain the feed's action sub-type
/// (opened/synchronize/closed), so every retained pull-request event counts.
const PULL_REQUEST_KIND: &str = "PullRequestEvent";

/// Aggregate answer for one repository.
///
/// With fewer than two matching events the averages are absent; that is the
/// expected answer for an underpopulated window, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrIntervalReport {
    /// Repository the report is about, `owner/name`.
    pub repo: String,

    /// Number of pull-request events observed in the retained window.
    pub count_pr: usize,

    /// Mean seconds between consecutive events, when at least two exist.
    pub average_seconds_between_prs: Option<f64>,

    /// Human-readable rendering of the mean, e.g. `"2h 30m"`.
    pub average_human_readable: Option<String>,
}

/// Compute the mean interval between consecutive pull-request events for
/// `repo` over the current snapshot.
///
/// Timestamps are sorted ascending before differencing: the store keeps
/// insertion order, and the feed does not guarantee time order within a
/// poll response.
pub fn average_pr_interval(store: &EventStore, repo: &str) -> PrIntervalReport {
    let mut timestamps: Vec<_> = store
        .snapshot()
        .into_iter()
        .filter(|event| event.kind == PULL_REQUEST_KIND && event.repo == repo)
        .map(|event| event.created_at)
        .collect();
    timestamps.sort_unstable();

    if timestamps.len() < 2 {
        return PrIntervalReport {
            repo: repo.to_string(),
            count_pr: timestamps.len(),
            average_seconds_between_prs: None,
            average_human_readable: None,
        };
    }

    let total_seconds: f64 = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds() as f64 / 1000.0)
        .sum();
    let average = total_seconds / (timestamps.len() - 1) as f64;

    PrIntervalReport {
        repo: repo.to_string(),
        count_pr: timestamps.len(),
        average_seconds_between_prs: Some(average),
        average_human_readable: Some(humanize_seconds(average)),
    }
}

/// Render a duration in seconds as its non-zero components, largest unit
/// first: `9000.0` becomes `"2h 30m"`. Sub-second durations floor to `"0s"`.
pub fn humanize_seconds(total_seconds: f64) -> String {
    let mut seconds = total_seconds as u64;
    let mut parts = Vec::new();

    for (unit, div) in [("d", 86_400), ("h", 3_600), ("m", 60), ("s", 1)] {
        if seconds >= div {
            let count = seconds / div;
            seconds %= div;
            parts.push(format!("{count}{unit}"));
        }
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use event_store::{EventRecord, StoreConfig};

    fn store_with(events: Vec<EventRecord>) -> EventStore {
        let store = EventStore::new(StoreConfig::default()).unwrap();
        store.add_events(events);
        store
    }

    #[test]
    fn test_single_pr_yields_count_without_average() {
        let base = Utc::now();
        let store = store_with(vec![
            EventRecord::new("1", "PullRequestEvent", "alice/repo", base),
            EventRecord::new("2", "IssuesEvent", "alice/repo", base + Duration::hours(1)),
        ]);

        let report = average_pr_interval(&store, "alice/repo");

        assert_eq!(report.count_pr, 1);
        assert_eq!(report.average_seconds_between_prs, None);
        assert_eq!(report.average_human_readable, None);
    }

    #[test]
    fn test_multiple_prs_average_and_rendering() {
        let base = Utc::now();
        let store = store_with(vec![
            EventRecord::new("1", "PullRequestEvent", "alice/repo", base),
            EventRecord::new("2", "PullRequestEvent", "alice/repo", base + Duration::hours(1)),
            EventRecord::new("3", "PullRequestEvent", "alice/repo", base + Duration::hours(5)),
        ]);

        let report = average_pr_interval(&store, "alice/repo");

        assert_eq!(report.count_pr, 3);
        assert_eq!(report.average_seconds_between_prs, Some(9000.0));
        assert_eq!(report.average_human_readable.as_deref(), Some("2h 30m"));
    }

    #[test]
    fn test_out_of_order_arrival_does_not_change_average() {
        let base = Utc::now();
        // Same events as above, inserted in shuffled order.
        let store = store_with(vec![
            EventRecord::new("3", "PullRequestEvent", "alice/repo", base + Duration::hours(5)),
            EventRecord::new("1", "PullRequestEvent", "alice/repo", base),
            EventRecord::new("2", "PullRequestEvent", "alice/repo", base + Duration::hours(1)),
        ]);

        let report = average_pr_interval(&store, "alice/repo");

        assert_eq!(report.average_seconds_between_prs, Some(9000.0));
    }

    #[test]
    fn test_only_matching_repo_and_kind_count() {
        let base = Utc::now();
        let store = store_with(vec![
            EventRecord::new("1", "PullRequestEvent", "alice/repo", base),
            EventRecord::new("2", "PullRequestEvent", "bob/tool", base + Duration::hours(1)),
            EventRecord::new("3", "WatchEvent", "alice/repo", base + Duration::hours(2)),
        ]);

        let report = average_pr_interval(&store, "alice/repo");

        assert_eq!(report.count_pr, 1);
        assert_eq!(report.average_seconds_between_prs, None);
    }

    #[test]
    fn test_no_events_for_unknown_repo() {
        let store = store_with(vec![]);

        let report = average_pr_interval(&store, "ghost/repo");

        assert_eq!(report.count_pr, 0);
        assert_eq!(report.average_seconds_between_prs, None);
    }

    #[test]
    fn test_is_deterministic_without_mutation() {
        let base = Utc::now();
        let store = store_with(vec![
            EventRecord::new("1", "PullRequestEvent", "alice/repo", base),
            EventRecord::new("2", "PullRequestEvent", "alice/repo", base + Duration::minutes(30)),
        ]);

        let first = average_pr_interval(&store, "alice/repo");
        let second = average_pr_interval(&store, "alice/repo");

        assert_eq!(first, second);
    }

    #[test]
    fn test_humanize_common_cases() {
        assert_eq!(humanize_seconds(9000.0), "2h 30m");
        assert_eq!(humanize_seconds(0.4), "0s");
        assert_eq!(humanize_seconds(59.0), "59s");
        assert_eq!(humanize_seconds(61.0), "1m 1s");
        assert_eq!(humanize_seconds(86_400.0), "1d");
        assert_eq!(humanize_seconds(90_061.0), "1d 1h 1m 1s");
        assert_eq!(humanize_seconds(3600.0), "1h");
    }
}
