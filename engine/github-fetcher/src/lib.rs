//! GitHub Fetcher Service
//!
//! This crate polls the GitHub public events feed on a fixed cadence,
//! translates acceptable raw items into [`event_store::EventRecord`]s, and
//! pushes accepted batches into a bound [`event_store::EventStore`].
//!
//! The poll loop runs as a dedicated background task with a cooperative stop
//! signal. Conditional requests (`If-None-Match` against the last seen ETag)
//! conserve the feed's unauthenticated rate-limit quota, and every cycle's
//! outcome is contained: a failed poll is logged and absorbed, never allowed
//! to end ingestion for the life of the process.

pub mod client;
pub mod config;
pub mod ingestor;
pub mod models;

pub use client::{FeedClient, FetchOutcome};
pub use config::{FetcherConfig, FetcherConfigError};
pub use ingestor::{CycleOutcome, FeedIngestor, IngestorError, IngestorState};
pub use models::RawEvent;
