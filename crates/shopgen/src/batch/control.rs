use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation flag shared between a runner and its callers.
///
/// Stopping never interrupts an executor call; executors that want to
/// abort their own network requests can await [`StopHandle::cancelled`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Requests a stop. Idempotent.
    pub fn stop(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once a stop has been requested (immediately if it already was).
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only returns on stop.
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }

    pub(crate) fn reset(&self) {
        self.sender.send_replace(false);
    }
}
