//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → server.rs run_handler (method check, executor trigger)
//!     → response.rs ({code, data, msg} body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeTriggerId, RequestIdExt, X_REQUEST_ID};
pub use response::ApiResponse;
pub use server::{ServerError, WebhookServer};
