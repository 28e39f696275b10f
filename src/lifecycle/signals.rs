//! OS signal handling.
//!
//! Ctrl+C (SIGINT) is translated into a [`Shutdown`] trigger.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C, then trigger `shutdown`.
pub async fn shutdown_on_ctrl_c(shutdown: Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Ctrl+C received");
            shutdown.trigger();
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                "Failed to listen for Ctrl+C; shutdown must be triggered manually"
            );
        }
    }
}

/// Spawn [`shutdown_on_ctrl_c`] in the background.
pub fn spawn_signal_listener(shutdown: &Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()))
}
