//! Configuration for the feed poller.

use std::collections::HashSet;

/// Default public events endpoint.
pub const GITHUB_EVENTS_URL: &str = "https://api.github.com/events";

/// API version header value pinned for the events endpoint.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Configuration for the feed poller.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Feed endpoint URL.
    pub events_url: String,

    /// Seconds between poll cycles. Keep conservative for unauthenticated
    /// usage; the public feed allows 60 requests per hour without a token.
    pub poll_interval_secs: u64,

    /// Items requested (and accepted) per poll cycle. The feed caps this
    /// at 100.
    pub events_per_poll: u32,

    /// Only these event kinds are translated into records.
    pub allowed_kinds: HashSet<String>,

    /// Optional bearer token for authenticated polling.
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            events_url: GITHUB_EVENTS_URL.to_string(),
            poll_interval_secs: 60,
            events_per_poll: 100,
            allowed_kinds: ["WatchEvent", "PullRequestEvent", "IssuesEvent"]
                .into_iter()
                .map(String::from)
                .collect(),
            auth_token: None,
            request_timeout_secs: 20,
        }
    }
}

impl FetcherConfig {
    /// Check the configuration for values the poller cannot operate with.
    pub fn validate(&self) -> Result<(), FetcherConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(FetcherConfigError::ZeroPollInterval);
        }
        if self.events_per_poll == 0 {
            return Err(FetcherConfigError::ZeroPageSize);
        }
        if self.allowed_kinds.is_empty() {
            return Err(FetcherConfigError::EmptyAllowedKinds);
        }
        Ok(())
    }
}

/// Construction-time configuration errors for the poller.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetcherConfigError {
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    #[error("events per poll must be non-zero")]
    ZeroPageSize,

    #[error("allowed kind set must not be empty")]
    EmptyAllowedKinds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FetcherConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.events_url, GITHUB_EVENTS_URL);
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.events_per_poll, 100);
        assert!(config.allowed_kinds.contains("PullRequestEvent"));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let config = FetcherConfig { poll_interval_secs: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(FetcherConfigError::ZeroPollInterval));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let config = FetcherConfig { events_per_poll: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(FetcherConfigError::ZeroPageSize));
    }

    #[test]
    fn test_rejects_empty_kind_set() {
        let config = FetcherConfig { allowed_kinds: HashSet::new(), ..Default::default() };
        assert_eq!(config.validate(), Err(FetcherConfigError::EmptyAllowedKinds));
    }
}
