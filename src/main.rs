//! Blog webhook server.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /run
//!     ─────────▶ http::server ──▶ executor::ScriptExecutor
//!                     │               validate → spawn → deadline race
//!                     │                              │
//!     {code,data,msg} ◀───────────────────────────────┘
//!
//!     SIGINT/SIGTERM ──▶ lifecycle::signals ──▶ Shutdown ──▶ bounded drain
//! ```

use std::process::ExitCode;

use blog_webhook::cli::Cli;
use blog_webhook::lifecycle::startup;
use blog_webhook::observability::init_logging;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("blog-webhook: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        script = %config.executor.script_path.display(),
        timeout_secs = config.executor.timeout_secs,
        drain_secs = config.shutdown.drain_secs,
        "blog-webhook starting"
    );

    match startup::supervise(config).await {
        Ok(()) => {
            tracing::info!("Server exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "start blog-webhook server failed");
            ExitCode::FAILURE
        }
    }
}
