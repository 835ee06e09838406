//! Service configuration loaded from environment variables.

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::{Context, Result};

use event_store::StoreConfig;
use github_fetcher::config::GITHUB_EVENTS_URL;
use github_fetcher::FetcherConfig;

/// Top-level configuration for the service binary.
///
/// Every field has a default so the service runs unconfigured; environment
/// variables override individual values. Unparseable numeric values are
/// fatal at startup rather than silently replaced.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the REST API binds to (`BIND_ADDR`).
    pub bind_addr: String,

    /// Seconds between feed polls (`POLL_INTERVAL_SECONDS`). Keep
    /// conservative for unauthenticated usage.
    pub poll_interval_secs: u64,

    /// Minutes of history the store retains (`RETENTION_MINUTES`).
    pub retention_minutes: i64,

    /// Items requested per poll (`EVENTS_PER_POLL`, feed caps at 100).
    pub events_per_poll: u32,

    /// Hard cap on stored records (`STORE_CAPACITY`).
    pub store_capacity: usize,

    /// Event kinds accepted from the feed (`ALLOWED_EVENT_KINDS`,
    /// comma-separated).
    pub allowed_kinds: HashSet<String>,

    /// Feed endpoint (`GITHUB_EVENTS_URL`).
    pub events_url: String,

    /// Optional bearer token for authenticated polling (`GITHUB_TOKEN`).
    pub auth_token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            poll_interval_secs: 60,
            retention_minutes: 4320,
            events_per_poll: 100,
            store_capacity: 100_000,
            allowed_kinds: ["WatchEvent", "PullRequestEvent", "IssuesEvent"]
                .into_iter()
                .map(String::from)
                .collect(),
            events_url: GITHUB_EVENTS_URL.to_string(),
            auth_token: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment over the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("BIND_ADDR") {
            config.bind_addr = value;
        }
        config.poll_interval_secs = parse_env("POLL_INTERVAL_SECONDS", config.poll_interval_secs)?;
        config.retention_minutes = parse_env("RETENTION_MINUTES", config.retention_minutes)?;
        config.events_per_poll = parse_env("EVENTS_PER_POLL", config.events_per_poll)?;
        config.store_capacity = parse_env("STORE_CAPACITY", config.store_capacity)?;
        if let Ok(value) = std::env::var("ALLOWED_EVENT_KINDS") {
            config.allowed_kinds = parse_kind_list(&value);
        }
        if let Ok(value) = std::env::var("GITHUB_EVENTS_URL") {
            config.events_url = value;
        }
        config.auth_token = std::env::var("GITHUB_TOKEN").ok().filter(|token| !token.is_empty());

        Ok(config)
    }

    /// Store bounds derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig { retention_minutes: self.retention_minutes, capacity: self.store_capacity }
    }

    /// Poller settings derived from this configuration.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            events_url: self.events_url.clone(),
            poll_interval_secs: self.poll_interval_secs,
            events_per_poll: self.events_per_poll,
            allowed_kinds: self.allowed_kinds.clone(),
            auth_token: self.auth_token.clone(),
            ..FetcherConfig::default()
        }
    }
}

/// Split a comma-separated kind list, ignoring surrounding whitespace and
/// empty entries.
fn parse_kind_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|kind| kind.trim().to_string())
        .filter(|kind| !kind.is_empty())
        .collect()
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {value:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sensible() {
        let config = ServiceConfig::default();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.retention_minutes, 4320);
        assert_eq!(config.events_per_poll, 100);
        assert_eq!(config.store_capacity, 100_000);
        assert_eq!(config.allowed_kinds.len(), 3);
        assert_eq!(config.events_url, GITHUB_EVENTS_URL);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_derived_store_config() {
        let config = ServiceConfig { retention_minutes: 60, store_capacity: 500, ..Default::default() };
        let store_config = config.store_config();

        assert_eq!(store_config.retention_minutes, 60);
        assert_eq!(store_config.capacity, 500);
    }

    #[test]
    fn test_derived_fetcher_config_keeps_request_timeout_default() {
        let config = ServiceConfig { poll_interval_secs: 5, ..Default::default() };
        let fetcher_config = config.fetcher_config();

        assert_eq!(fetcher_config.poll_interval_secs, 5);
        assert_eq!(fetcher_config.request_timeout_secs, FetcherConfig::default().request_timeout_secs);
        assert!(fetcher_config.validate().is_ok());
    }

    #[test]
    fn test_parse_kind_list_trims_and_drops_empties() {
        let kinds = parse_kind_list("WatchEvent, PullRequestEvent ,,IssuesEvent,");

        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains("WatchEvent"));
        assert!(kinds.contains("PullRequestEvent"));
        assert!(kinds.contains("IssuesEvent"));
    }
}
