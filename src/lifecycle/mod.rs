//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bind listener → Subscribe to signals → Serve
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain in-flight requests (bounded) → Exit
//!
//! State (state.rs):
//!     Starting → Serving → Draining → Stopped
//! ```
//!
//! # Design Decisions
//! - Shutdown has a timeout: remaining connections are dropped after the drain window
//! - Startup faults are reported by a guard, never an unhandled panic

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::Shutdown;
pub use state::{Lifecycle, LifecycleState};
