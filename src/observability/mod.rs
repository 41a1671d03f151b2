//! Observability subsystem.
//!
//! Structured logging via `tracing`. HTTP request spans come from
//! `tower_http::trace::TraceLayer`; each trigger runs inside a span carrying
//! its request ID.

pub mod logging;

pub use logging::init_logging;
