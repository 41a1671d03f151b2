//! Startup orchestration and the top-level guard.
//!
//! # Responsibilities
//! - Bind the listener and install the signal subscription
//! - Hand the listener to the HTTP server
//! - Turn bind failures, serve failures and panics into reportable errors

use std::any::Any;
use std::future::Future;

use tokio::net::TcpListener;

use crate::config::WebhookConfig;
use crate::executor::script;
use crate::http::server::{ServerError, WebhookServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("server task panicked: {0}")]
    Panicked(String),
}

/// Bind, serve and shut down on SIGINT/SIGTERM.
pub async fn launch(config: WebhookConfig) -> Result<(), StartupError> {
    check_script(&config).await;

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    serve(listener, &config, signals::termination()).await
}

/// Serve on `listener` until `signal` resolves and the drain finishes.
async fn serve<F>(listener: TcpListener, config: &WebhookConfig, signal: F) -> Result<(), StartupError>
where
    F: Future<Output = std::io::Result<&'static str>> + Send + 'static,
{
    // Held until the server returns: a closed channel would stop it.
    let shutdown = Shutdown::new();
    let server = WebhookServer::new(config);
    let server_shutdown = shutdown.subscribe();
    signals::listen_for(shutdown.clone(), signal);

    server.run(listener, server_shutdown).await?;
    drop(shutdown);
    Ok(())
}

/// Run [`launch`] on its own task so that a panic anywhere in startup or
/// serving is reported as an error instead of tearing down the process.
pub async fn supervise(config: WebhookConfig) -> Result<(), StartupError> {
    match tokio::spawn(launch(config)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(StartupError::Panicked(panic_message(e.into_panic()))),
        Err(e) => Err(StartupError::Panicked(e.to_string())),
    }
}

/// Warn early about a script that every trigger would reject. The server
/// still starts; the file may appear later.
async fn check_script(config: &WebhookConfig) {
    let path = &config.executor.script_path;
    if path.as_os_str().is_empty() {
        tracing::warn!("No shell file configured, every trigger will be rejected");
        return;
    }
    match script::prepare(path, &config.executor.extension).await {
        Ok(resolved) => tracing::info!(script = %resolved.display(), "Shell file ready"),
        Err(e) => tracing::warn!(script = %path.display(), error = %e, "Shell file is not runnable yet"),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
