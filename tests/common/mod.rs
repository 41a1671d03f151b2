//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use blog_webhook::config::WebhookConfig;
use blog_webhook::http::WebhookServer;
use blog_webhook::lifecycle::{LifecycleState, Shutdown};
use blog_webhook::ScriptExecutor;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Write `body` to `name` inside `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub lifecycle: watch::Receiver<LifecycleState>,
    pub handle: JoinHandle<Result<(), blog_webhook::http::ServerError>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}/run", self.addr)
    }
}

/// Start a server for `script` with a script deadline and drain window.
pub async fn start_server(script: &Path, timeout: Duration, drain: Duration) -> TestServer {
    let mut config = WebhookConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.executor.script_path = script.to_path_buf();

    let executor = ScriptExecutor::new(&config.executor).with_timeout(timeout);
    let server = WebhookServer::with_executor(&config, executor).with_drain(drain);
    let mut lifecycle = server.lifecycle();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(server.run(listener, server_shutdown));
    lifecycle
        .wait_for(|s| *s == LifecycleState::Serving)
        .await
        .unwrap();

    TestServer {
        addr,
        shutdown,
        lifecycle,
        handle,
    }
}

/// An HTTP client that never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
