//! Blog webhook library.
//!
//! One HTTP endpoint that runs a preconfigured shell script and reports the
//! outcome as `{"code", "data", "msg"}` JSON.

pub mod cli;
pub mod config;
pub mod executor;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::WebhookConfig;
pub use executor::ScriptExecutor;
pub use http::WebhookServer;
pub use lifecycle::Shutdown;
