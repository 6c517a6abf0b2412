//! Runtime - Shutdown signal shared by the dispatcher and forwarder tasks

use std::sync::atomic::{AtomicBool, Ordering};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shutdown signal broadcaster
///
/// Triggering is synchronous so it can run from `Drop`.
#[derive(Clone)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Default for Shutdown {
    fn default() -> Self { Self::new() }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender, triggered: Arc::new(AtomicBool::new(false)) }
    }

    /// Subscribe to shutdown signal
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Trigger shutdown. Only the first call broadcasts.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            let _ = self.sender.send(());
        }
    }

    /// Check if shutdown was triggered
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown is triggered, including when it already was.
    /// If every `Shutdown` handle is dropped first, it never resolves.
    pub fn triggered(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        let already = self.is_triggered();
        async move {
            if already {
                return;
            }
            if let Err(broadcast::error::RecvError::Closed) = rx.recv().await {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_broadcasts_once() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        shutdown.trigger();
        shutdown.trigger();
        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn triggered_resolves_after_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.triggered().await;

        let late = Shutdown::new();
        let waiting = late.triggered();
        late.trigger();
        waiting.await;
    }
}
