//! Shutdown coordination and the bounded drain.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the server (and tests) subscribe to.
/// Triggering more than once is harmless.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to shut down.
    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(subscribers = notified, "Shutdown triggered");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// How a drained server future ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Drained<T> {
    /// The future finished on its own (all in-flight work completed).
    Completed(T),
    /// The drain window elapsed first; the future was dropped.
    Expired,
}

/// Drive `serve` to completion, but once `draining` fires give it at most
/// `window` more before dropping it.
///
/// If `draining` is dropped without firing, `serve` runs unbounded.
pub async fn bounded_drain<F>(
    serve: F,
    draining: oneshot::Receiver<()>,
    window: Duration,
) -> Drained<F::Output>
where
    F: Future,
{
    let bound = async move {
        if draining.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(window).await;
    };

    tokio::select! {
        output = serve => Drained::Completed(output),
        _ = bound => Drained::Expired,
    }
}
