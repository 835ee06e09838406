//! Conditional HTTP client for the events feed.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};

use crate::config::{FetcherConfig, GITHUB_API_VERSION};
use crate::models::RawEvent;

/// Result of one conditional fetch against the feed.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Server replied 304: nothing changed since the presented etag.
    NotModified,

    /// Fresh payload, plus the etag to present next cycle (when supplied).
    Fetched { items: Vec<RawEvent>, etag: Option<String> },
}

/// HTTP client for the events endpoint.
///
/// Built once per ingestor run with an explicit request timeout; the poll
/// loop owns it exclusively.
pub struct FeedClient {
    client: Client,
    config: FetcherConfig,
}

impl FeedClient {
    /// Create a client with the configured request timeout.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Fetch one page of events, presenting `etag` so the server may answer
    /// with "not modified".
    ///
    /// Non-304 non-success statuses and transport failures are errors for
    /// the caller to absorb; they are expected steady-state noise on a
    /// public feed.
    pub async fn fetch_events(&self, etag: Option<&str>) -> Result<FetchOutcome> {
        let mut request = self
            .client
            .get(&self.config.events_url)
            .query(&[("per_page", self.config.events_per_poll)])
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);

        if let Some(token) = &self.config.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(etag) = etag {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request.send().await.context("Failed to fetch events feed")?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !response.status().is_success() {
            anyhow::bail!("feed request failed with status: {}", response.status());
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let items: Vec<RawEvent> =
            response.json().await.context("Failed to parse events feed JSON")?;

        Ok(FetchOutcome::Fetched { items, etag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_client_with_default_config() {
        assert!(FeedClient::new(FetcherConfig::default()).is_ok());
    }
}
