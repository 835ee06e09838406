//! Logging and tracing setup.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging and tracing for the service binary.
///
/// Honors `RUST_LOG` when set, defaulting to `info` otherwise.
pub fn initialize_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();

    Ok(())
}
