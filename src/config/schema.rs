//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the webhook.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the webhook server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Listener configuration (bind address, route).
    pub listener: ListenerConfig,

    /// The script to trigger and how to run it.
    pub executor: ExecutorConfig,

    /// HTTP-level timeouts.
    pub timeouts: TimeoutConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl WebhookConfig {
    /// Effective HTTP request timeout in seconds.
    pub fn request_secs(&self) -> u64 {
        self.timeouts
            .request_secs
            .unwrap_or_else(|| self.executor.timeout_secs.saturating_add(REQUEST_MARGIN_SECS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_secs())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:10002").
    pub bind_address: String,

    /// Path of the trigger endpoint.
    pub route: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:10002".to_string(),
            route: "/run".to_string(),
        }
    }
}

/// Script execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Script triggered by every request. Relative paths resolve against
    /// the working directory at trigger time.
    pub script_path: PathBuf,

    /// Interpreter invoked with the script path as its only argument.
    pub interpreter: PathBuf,

    /// Required file extension, without the leading dot.
    pub extension: String,

    /// Deadline for one script run, in seconds.
    pub timeout_secs: u64,

    /// Kill the script's process group when the deadline wins the race.
    /// When false the script keeps running detached.
    pub kill_on_timeout: bool,
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            script_path: PathBuf::new(),
            interpreter: PathBuf::from("/bin/sh"),
            extension: "sh".to_string(),
            timeout_secs: 20,
            kill_on_timeout: true,
        }
    }
}

/// Headroom between the script deadline and the derived request timeout.
pub const REQUEST_MARGIN_SECS: u64 = 10;

/// Timeout configuration for the HTTP layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must exceed `executor.timeout_secs` so the script deadline answers first.
    /// When unset it follows the script deadline plus [`REQUEST_MARGIN_SECS`].
    pub request_secs: Option<u64>,
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Window given to in-flight requests after a termination signal, in seconds.
    pub drain_secs: u64,
}

impl ShutdownConfig {
    pub fn drain(&self) -> Duration {
        Duration::from_secs(self.drain_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { drain_secs: 5 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
