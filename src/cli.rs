//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, ConfigError, Overrides, WebhookConfig};

#[derive(Debug, Parser)]
#[command(name = "blog-webhook")]
#[command(version, about = "Run a shell script when a webhook is called", long_about = None)]
pub struct Cli {
    /// Shell file (.sh) to execute on every trigger
    #[arg(long)]
    pub shell_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:10002
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Seconds a script may run before the trigger times out
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Seconds before the HTTP layer gives up on a request
    /// [default: script timeout + 10]
    #[arg(long)]
    pub request_secs: Option<u64>,

    /// Seconds given to in-flight requests after a shutdown signal
    #[arg(long)]
    pub drain_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            script_path: self.shell_file.clone(),
            bind_address: self.bind.clone(),
            timeout_secs: self.timeout_secs,
            request_secs: self.request_secs,
            drain_secs: self.drain_secs,
            log_level: self.log_level.clone(),
        }
    }

    /// Resolve the effective configuration for this invocation.
    pub fn into_config(self) -> Result<WebhookConfig, ConfigError> {
        let overrides = self.overrides();
        load_config(self.config.as_deref(), overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_file_flag_sets_script() {
        let cli = Cli::try_parse_from(["blog-webhook", "--shell-file", "deploy.sh"]).unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.executor.script_path, PathBuf::from("deploy.sh"));
        assert_eq!(config.listener.bind_address, "0.0.0.0:10002");
    }

    #[test]
    fn flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "blog-webhook",
            "--bind",
            "127.0.0.1:8080",
            "--timeout-secs",
            "5",
            "--drain-secs",
            "2",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.executor.timeout_secs, 5);
        assert_eq!(config.shutdown.drain_secs, 2);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn long_script_timeout_alone_is_accepted() {
        let cli = Cli::try_parse_from([
            "blog-webhook",
            "--shell-file",
            "deploy.sh",
            "--timeout-secs",
            "60",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.executor.timeout_secs, 60);
        assert_eq!(config.request_secs(), 70);
    }

    #[test]
    fn request_timeout_flag_is_validated_against_script_timeout() {
        let cli = Cli::try_parse_from(["blog-webhook", "--timeout-secs", "60", "--request-secs", "90"])
            .unwrap();
        assert_eq!(cli.into_config().unwrap().request_secs(), 90);

        let cli = Cli::try_parse_from(["blog-webhook", "--timeout-secs", "60", "--request-secs", "30"])
            .unwrap();
        let err = cli.into_config().unwrap_err();
        assert!(err.to_string().contains("request timeout (30s)"));
    }

    #[test]
    fn no_flags_is_allowed() {
        let cli = Cli::try_parse_from(["blog-webhook"]).unwrap();
        assert!(cli.shell_file.is_none());
        assert!(cli.into_config().is_ok());
    }

    #[test]
    fn version_flag_is_supported() {
        let err = Cli::try_parse_from(["blog-webhook", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
