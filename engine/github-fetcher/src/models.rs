//! Wire models for the public events feed payload.

use serde::Deserialize;

/// One raw item from the events feed.
///
/// Every field is optional: the feed occasionally ships partial items, and a
/// missing or malformed field must drop only that item, never the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    /// Feed-assigned unique id.
    pub id: Option<String>,

    /// Event kind discriminator (`WatchEvent`, `PullRequestEvent`, ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Repository the event belongs to.
    pub repo: Option<RawRepo>,

    /// ISO-8601 timestamp, `Z` suffix accepted as UTC.
    pub created_at: Option<String>,
}

/// Repository stub embedded in a feed item.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepo {
    /// `owner/name` of the repository.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_item() {
        let json = r#"{
            "id": "46811234567",
            "type": "PullRequestEvent",
            "repo": {"id": 1, "name": "alice/repo", "url": "https://api.github.com/repos/alice/repo"},
            "created_at": "2025-06-01T12:00:00Z",
            "public": true
        }"#;

        let item: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_deref(), Some("46811234567"));
        assert_eq!(item.kind.as_deref(), Some("PullRequestEvent"));
        assert_eq!(item.repo.unwrap().name.as_deref(), Some("alice/repo"));
        assert_eq!(item.created_at.as_deref(), Some("2025-06-01T12:00:00Z"));
    }

    #[test]
    fn test_tolerates_missing_fields() {
        let item: RawEvent = serde_json::from_str(r#"{"type": "WatchEvent"}"#).unwrap();
        assert!(item.id.is_none());
        assert!(item.repo.is_none());
        assert!(item.created_at.is_none());
    }
}
