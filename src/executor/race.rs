//! The deadline race.
//!
//! One task owns the child process and reports through a one-shot channel.
//! The caller selects between that channel and the deadline; whichever
//! branch `select!` takes is the only result ever produced. The losing
//! side's result has nowhere to go once the receiver is dropped.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::executor::outcome::{ExecutionOutcome, TriggerOutcome};
use crate::executor::process::ScriptProcess;

/// What happens to a script that loses the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Kill the script's process group.
    Kill,
    /// Stop waiting and leave the script running.
    Abandon,
}

impl From<bool> for TimeoutPolicy {
    fn from(kill_on_timeout: bool) -> Self {
        if kill_on_timeout {
            TimeoutPolicy::Kill
        } else {
            TimeoutPolicy::Abandon
        }
    }
}

/// Run `interpreter script` and wait for it until `deadline`.
pub async fn run_until(
    interpreter: Arc<PathBuf>,
    script: PathBuf,
    deadline: Instant,
    policy: TimeoutPolicy,
) -> TriggerOutcome {
    let (done_tx, done_rx) = oneshot::channel();
    let (abandon_tx, abandon_rx) = oneshot::channel::<()>();

    tokio::spawn(execute(interpreter, script, policy, done_tx, abandon_rx));

    tokio::select! {
        result = done_rx => match result {
            Ok(outcome) => TriggerOutcome::Completed(outcome),
            // Sender dropped without a result: the task panicked.
            Err(_) => TriggerOutcome::Completed(ExecutionOutcome::failure(
                String::new(),
                "script task ended unexpectedly",
            )),
        },
        _ = tokio::time::sleep_until(deadline) => {
            let _ = abandon_tx.send(());
            TriggerOutcome::TimedOut
        }
    }
}

async fn execute(
    interpreter: Arc<PathBuf>,
    script: PathBuf,
    policy: TimeoutPolicy,
    done: oneshot::Sender<ExecutionOutcome>,
    abandoned: oneshot::Receiver<()>,
) {
    let mut process = match ScriptProcess::spawn(&interpreter, &script) {
        Ok(process) => process.kill_on_drop(policy == TimeoutPolicy::Kill),
        Err(e) => {
            tracing::warn!(script = %script.display(), error = %e, "Script failed to start");
            let _ = done.send(ExecutionOutcome::failure(String::new(), e));
            return;
        }
    };
    let pid = process.id();
    tracing::debug!(script = %script.display(), pid = ?pid, "Script started");

    let outcome = match policy {
        TimeoutPolicy::Kill => {
            // Only the deadline message stops the script. A dropped sender
            // means the caller went away (client disconnect); keep running.
            let finished = tokio::select! {
                outcome = process.wait() => Some(outcome),
                Ok(()) = abandoned => None,
            };
            match finished {
                Some(outcome) => outcome,
                None => {
                    process.terminate();
                    tracing::warn!(script = %script.display(), pid = ?pid, "Script killed after deadline");
                    return;
                }
            }
        }
        TimeoutPolicy::Abandon => process.wait().await,
    };

    if let Err(late) = done.send(outcome) {
        tracing::info!(
            script = %script.display(),
            pid = ?pid,
            succeeded = late.succeeded,
            "Script finished after its deadline, result discarded"
        );
    }
}
