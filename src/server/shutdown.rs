//! Shutdown coordination for the server.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation token for the accept loop.
///
/// Clones share one flag. Signal handlers set it; the listener checks it at
/// every loop iteration.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create a new, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            tracing::info!("Shutdown requested");
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
