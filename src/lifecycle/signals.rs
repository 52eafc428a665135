//! OS signal handling.

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Spawn a task that fires `shutdown` on Ctrl+C (SIGINT).
pub fn spawn_ctrl_c(shutdown: Arc<Shutdown>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                return;
            }
        }
        shutdown.trigger();
    })
}
