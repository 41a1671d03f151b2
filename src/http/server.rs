//! HTTP server setup and the trigger handler.
//!
//! # Responsibilities
//! - Create the Axum Router with the single trigger route
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Serve until shutdown, then drain for a bounded window
//! - Publish lifecycle transitions

use std::future::IntoFuture;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot, watch};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::WebhookConfig;
use crate::executor::ScriptExecutor;
use crate::http::request::{MakeTriggerId, RequestIdExt, X_REQUEST_ID};
use crate::http::response::{method_not_allowed, ApiResponse};
use crate::lifecycle::shutdown::{bounded_drain, Drained};
use crate::lifecycle::{Lifecycle, LifecycleState};

/// Error type for serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("listener has no local address: {0}")]
    LocalAddr(#[source] std::io::Error),

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: ScriptExecutor,
}

/// HTTP server exposing the trigger endpoint.
pub struct WebhookServer {
    router: Router,
    route: String,
    drain: Duration,
    lifecycle: Lifecycle,
}

impl WebhookServer {
    /// Create a server that triggers the script named in `config`.
    pub fn new(config: &WebhookConfig) -> Self {
        Self::with_executor(config, ScriptExecutor::new(&config.executor))
    }

    /// Create a server around an already-built executor.
    pub fn with_executor(config: &WebhookConfig, executor: ScriptExecutor) -> Self {
        let state = AppState { executor };
        Self {
            router: build_router(config, state),
            route: config.listener.route.clone(),
            drain: config.shutdown.drain(),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Override the drain window with a finer-grained duration.
    pub fn with_drain(mut self, drain: Duration) -> Self {
        self.drain = drain;
        self
    }

    /// Watch the server's lifecycle state.
    pub fn lifecycle(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires and the drain completes or expires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        self.lifecycle.advance(LifecycleState::Serving);
        tracing::info!(address = %addr, route = %self.route, "Webhook server is running");

        let (draining_tx, draining_rx) = oneshot::channel();
        let lifecycle = self.lifecycle.clone();
        let signal = async move {
            // A closed channel means the coordinator is gone; stop as well.
            let _ = shutdown.recv().await;
            lifecycle.advance(LifecycleState::Draining);
            tracing::info!("Draining in-flight requests");
            let _ = draining_tx.send(());
        };

        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .into_future();

        let result = match bounded_drain(serve, draining_rx, self.drain).await {
            Drained::Completed(result) => result.map_err(ServerError::Serve),
            Drained::Expired => {
                tracing::warn!(
                    drain_ms = self.drain.as_millis() as u64,
                    "Server forced to shutdown, drain window elapsed"
                );
                Ok(())
            }
        };

        self.lifecycle.advance(LifecycleState::Stopped);
        tracing::info!("HTTP server stopped");
        result
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &WebhookConfig, state: AppState) -> Router {
    Router::new()
        .route(&config.listener.route, any(run_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeTriggerId))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
}

/// Trigger handler: GET runs the script once, anything else is refused.
async fn run_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().to_string();
    let method = request.method().clone();

    if method != Method::GET {
        tracing::warn!(request_id = %request_id, method = %method, "Illegal request method");
        return method_not_allowed();
    }

    let span = tracing::info_span!("trigger", request_id = %request_id);
    let started = Instant::now();
    let outcome = state.executor.trigger().instrument(span).await;

    tracing::info!(
        request_id = %request_id,
        outcome = outcome.kind(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Trigger resolved"
    );

    ApiResponse::from(outcome).into_response()
}
