//! Core record type shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accepted feed event.
///
/// Records are immutable once constructed: the ingestor builds them from raw
/// feed items and the store only ever copies or drops them. The `id` is the
/// deduplication key and is unique among live records; `created_at` is
/// timezone-normalized to UTC by the translation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Globally unique id assigned by the feed.
    pub id: String,

    /// Event kind tag, e.g. `WatchEvent`, `PullRequestEvent`, `IssuesEvent`.
    /// Serialized as `type` to match the feed's own wire name.
    #[serde(rename = "type")]
    pub kind: String,

    /// Repository the event belongs to, in `owner/name` form. Empty when the
    /// source item carried no repository.
    pub repo: String,

    /// When the event occurred upstream (UTC).
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Build a record from its parts.
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        repo: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self { id: id.into(), kind: kind.into(), repo: repo.into(), created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_kind_as_type() {
        let record = EventRecord::new(
            "1",
            "WatchEvent",
            "alice/repo",
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "WatchEvent");
        assert_eq!(json["repo"], "alice/repo");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_round_trips_through_json() {
        let record = EventRecord::new(
            "abc",
            "IssuesEvent",
            "bob/tool",
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap(),
        );

        let json = serde_json::to_string(&record).unwrap();
        let parsed: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
