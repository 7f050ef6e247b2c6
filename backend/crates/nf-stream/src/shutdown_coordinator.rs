use crate::ShutdownGuard;

use std::sync::Arc;

use tokio::sync::watch;

/// Graceful shutdown coordinator.
///
/// The signal is level-triggered: guards created after `shutdown()` observe it
/// immediately.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Get a receiver for shutdown notifications
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Trigger shutdown (call this from signal handler)
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            log::info!("Shutdown signal received, notifying all subsystems");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Convenience method to create a guard (used by flush tasks)
    pub fn subscribe_guard(&self) -> ShutdownGuard {
        ShutdownGuard::new(self)
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
