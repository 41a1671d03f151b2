//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (command-line overrides)
//!     → validation.rs (semantic checks)
//!     → WebhookConfig (validated, immutable)
//!     → passed explicitly to the executor and HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never re-read per request
//! - All fields have defaults to allow running with only `--shell-file`
//! - The script itself is checked per trigger, not here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Overrides};
pub use schema::{
    ExecutorConfig, ListenerConfig, LogFormat, ObservabilityConfig, ShutdownConfig,
    TimeoutConfig, WebhookConfig,
};
pub use validation::ValidationError;
