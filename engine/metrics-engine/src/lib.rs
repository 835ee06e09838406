//! Metrics Engine
//!
//! Read-side aggregation for the gh-pulse service. Every function here is a
//! pure computation over a store snapshot: no internal state, no locking
//! beyond what the store itself does, and deterministic results for a given
//! input. Underpopulated windows yield zeroed or absent aggregates, never
//! errors; the only error surfaced is the caller-contract violation of
//! querying a window wider than the store retains.

pub mod aggregation;
pub mod interval;

pub use aggregation::{count_events_by_kind, MetricsError};
pub use interval::{average_pr_interval, humanize_seconds, PrIntervalReport};
