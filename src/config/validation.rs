//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! constraints. Every problem is reported, not just the first one.

use std::net::SocketAddr;

use crate::config::schema::WebhookConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("route '{0}' must start with '/'")]
    Route(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("request timeout ({request_secs}s) must exceed the executor timeout ({executor_secs}s)")]
    RequestTimeout { request_secs: u64, executor_secs: u64 },

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Check a configuration before it is accepted into the system.
pub fn validate_config(config: &WebhookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if !config.listener.route.starts_with('/') {
        errors.push(ValidationError::Route(config.listener.route.clone()));
    }

    if config.executor.timeout_secs == 0 {
        errors.push(ValidationError::Zero("executor.timeout_secs"));
    }

    if config.shutdown.drain_secs == 0 {
        errors.push(ValidationError::Zero("shutdown.drain_secs"));
    }

    if let Some(request_secs) = config.timeouts.request_secs {
        if request_secs <= config.executor.timeout_secs {
            errors.push(ValidationError::RequestTimeout {
                request_secs,
                executor_secs: config.executor.timeout_secs,
            });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
