//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on unix, SIGTERM both trigger [`Shutdown`].
//! SIGPIPE needs no handler: the Rust runtime ignores it for binaries, so a
//! write to a closed peer comes back as a `BrokenPipe` error on that
//! connection only.

use tokio::signal;

use crate::server::shutdown::Shutdown;

/// Waits for the first termination signal.
pub async fn termination_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Spawns a task that triggers `shutdown` on the first termination signal.
pub fn spawn_signal_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        termination_signal().await;
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    })
}
