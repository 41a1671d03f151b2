//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::WebhookConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Values supplied on the command line. Anything set here wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub script_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub timeout_secs: Option<u64>,
    pub request_secs: Option<u64>,
    pub drain_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Overrides {
    /// Apply the overrides on top of `config`.
    pub fn apply(self, config: &mut WebhookConfig) {
        if let Some(path) = self.script_path {
            config.executor.script_path = path;
        }
        if let Some(addr) = self.bind_address {
            config.listener.bind_address = addr;
        }
        if let Some(secs) = self.timeout_secs {
            config.executor.timeout_secs = secs;
        }
        if let Some(secs) = self.request_secs {
            config.timeouts.request_secs = Some(secs);
        }
        if let Some(secs) = self.drain_secs {
            config.shutdown.drain_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

/// Parse a configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<WebhookConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: defaults, then the optional file,
/// then command-line overrides. The result is validated.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<WebhookConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => WebhookConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
