//! Signal handling for graceful shutdown.

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Set up shutdown signal handlers.
///
/// The returned receiver resolves once SIGINT (Ctrl+C) or, on Unix, SIGTERM
/// arrives. Registration failures are logged and leave the receiver pending;
/// the process then only stops with the runtime.
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to register SIGTERM handler: {e}");
                    return;
                }
            };

            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Failed to listen for Ctrl+C signal: {e}");
                        return;
                    }
                    info!("Ctrl+C signal received");
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM signal received");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C signal: {e}");
                return;
            }
            info!("Ctrl+C signal received");
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}
