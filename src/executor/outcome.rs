//! Results of a trigger.

use crate::executor::script::ScriptError;

/// The result of one script run that finished before its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub succeeded: bool,
    /// Standard output followed by standard error.
    pub combined_output: String,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(combined_output: String) -> Self {
        Self {
            succeeded: true,
            combined_output,
            error: None,
        }
    }

    pub fn failure(combined_output: String, error: impl ToString) -> Self {
        Self {
            succeeded: false,
            combined_output,
            error: Some(error.to_string()),
        }
    }
}

/// How a trigger resolved. Exactly one of these is produced per trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The script failed pre-flight checks; no process was spawned.
    Rejected(ScriptError),
    /// The script exited (or failed to start) before the deadline.
    Completed(ExecutionOutcome),
    /// The deadline elapsed first.
    TimedOut,
}

impl TriggerOutcome {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerOutcome::Rejected(_) => "rejected",
            TriggerOutcome::Completed(o) if o.succeeded => "succeeded",
            TriggerOutcome::Completed(_) => "failed",
            TriggerOutcome::TimedOut => "timed_out",
        }
    }
}
