//! GH Pulse Service
//!
//! Composition root for the events monitor: loads configuration from the
//! environment, wires the event store, feed ingestor, and metrics together,
//! and serves the REST query surface. All wiring happens here by explicit
//! injection; no other crate holds ambient state.

pub mod config;
pub mod logging;
pub mod rest_api;
pub mod signals;

pub use config::ServiceConfig;
pub use logging::initialize_logging;
pub use signals::setup_signal_handlers;
