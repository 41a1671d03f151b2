//! Triggered script execution.
//!
//! # Data Flow
//! ```text
//! trigger()
//!     → deadline fixed
//!     → script.rs (path, extension and content checks; no spawn on failure)
//!     → race.rs (spawn task + select on completion vs. deadline)
//!     → process.rs (interpreter child, combined output, group kill)
//!     → TriggerOutcome (exactly one per trigger)
//! ```
//!
//! # Design Decisions
//! - No shared mutable state: each trigger owns its channels and child
//! - Concurrent triggers run concurrent scripts, unserialized
//! - The select is the single point that decides "finished in time"

pub mod outcome;
pub mod process;
pub mod race;
pub mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::ExecutorConfig;

pub use outcome::{ExecutionOutcome, TriggerOutcome};
pub use process::ExecError;
pub use race::TimeoutPolicy;
pub use script::ScriptError;

/// Runs the configured script on demand. Cheap to clone; shared by all requests.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    script_path: Arc<PathBuf>,
    interpreter: Arc<PathBuf>,
    extension: Arc<str>,
    timeout: Duration,
    policy: TimeoutPolicy,
}

impl ScriptExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            script_path: Arc::new(config.script_path.clone()),
            interpreter: Arc::new(config.interpreter.clone()),
            extension: Arc::from(config.extension.as_str()),
            timeout: config.timeout(),
            policy: config.kill_on_timeout.into(),
        }
    }

    /// Override the deadline with a finer-grained duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate and run the script once, bounded by the deadline.
    pub async fn trigger(&self) -> TriggerOutcome {
        let deadline = deadline_after(self.timeout);

        let resolved = match script::prepare(&self.script_path, &self.extension).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(
                    script = %self.script_path.display(),
                    error = %e,
                    "Script rejected before execution"
                );
                return TriggerOutcome::Rejected(e);
            }
        };

        tracing::info!(script = %resolved.display(), "Executing script");
        let outcome = race::run_until(self.interpreter.clone(), resolved, deadline, self.policy).await;

        if let TriggerOutcome::Completed(ExecutionOutcome {
            succeeded: false,
            combined_output,
            error,
        }) = &outcome
        {
            tracing::warn!(
                error = error.as_deref().unwrap_or_default(),
                output = %combined_output,
                "Script failed"
            );
        }
        outcome
    }
}

/// Deadlines beyond what `Instant` can represent are clamped to roughly
/// 30 years out, the same horizon `tokio::time::sleep` uses.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or(now + FAR_FUTURE)
}
