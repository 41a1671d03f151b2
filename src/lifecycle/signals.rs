//! OS signal handling.
//!
//! SIGINT and SIGTERM start the drain. SIGKILL cannot be caught.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Wait for the first termination signal and return its name.
#[cfg(unix)]
pub async fn termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
pub async fn termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

/// Trigger `shutdown` when a termination signal arrives.
pub fn listen(shutdown: Shutdown) -> JoinHandle<()> {
    listen_for(shutdown, termination())
}

/// Trigger `shutdown` once `signal` resolves. If the signal handlers cannot
/// be installed nothing is triggered and the server keeps serving.
pub fn listen_for<F>(shutdown: Shutdown, signal: F) -> JoinHandle<()>
where
    F: Future<Output = std::io::Result<&'static str>> + Send + 'static,
{
    tokio::spawn(async move {
        match signal.await {
            Ok(signal) => {
                tracing::info!(signal, "Shutting down server...");
                shutdown.trigger();
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to install signal handlers, server keeps running until killed"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn resolved_signal_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        listen_for(shutdown, async { Ok("SIGTERM") }).await.unwrap();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn install_failure_triggers_nothing() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        listen_for(shutdown.clone(), async { Err(std::io::Error::other("no signals")) })
            .await
            .unwrap();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
