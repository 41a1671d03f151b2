//! Child process management for one script run.
//!
//! The interpreter is started in its own process group so that a timed-out
//! run can be terminated together with everything it forked.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::executor::outcome::ExecutionOutcome;

/// Maximum bytes captured per output stream (10 MiB).
const MAX_OUTPUT_BYTES: u64 = 10 * 1024 * 1024;

/// Why a script run did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for script: {0}")]
    Wait(#[source] std::io::Error),

    #[error("exit status {0}")]
    ExitCode(i32),

    #[error("signal: {0}")]
    Signal(i32),
}

impl ExecError {
    fn from_status(status: ExitStatus) -> Option<Self> {
        if status.success() {
            return None;
        }
        if let Some(code) = status.code() {
            return Some(ExecError::ExitCode(code));
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Some(ExecError::Signal(signal));
            }
        }
        Some(ExecError::ExitCode(-1))
    }
}

/// A running script with its output being drained in the background.
pub struct ScriptProcess {
    child: Child,
    stdout: JoinHandle<Vec<u8>>,
    stderr: JoinHandle<Vec<u8>>,
    kill_on_drop: bool,
}

impl ScriptProcess {
    /// Start `interpreter script` with both output streams captured.
    pub fn spawn(interpreter: &Path, script: &Path) -> Result<Self, ExecError> {
        let mut cmd = Command::new(interpreter);
        cmd.arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            interpreter: interpreter.display().to_string(),
            source,
        })?;

        // Readers run on their own tasks so `wait` can borrow the child.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        Ok(Self {
            child,
            stdout: tokio::spawn(read_stream(stdout)),
            stderr: tokio::spawn(read_stream(stderr)),
            kill_on_drop: false,
        })
    }

    /// Kill the process group if this handle is dropped while the script
    /// is still running, e.g. when the runtime shuts down mid-run.
    pub fn kill_on_drop(mut self, enabled: bool) -> Self {
        self.kill_on_drop = enabled;
        self
    }

    /// OS process id, if the child has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the script to exit and collect its combined output.
    pub async fn wait(&mut self) -> ExecutionOutcome {
        let status = match self.child.wait().await {
            Ok(status) => status,
            Err(e) => return ExecutionOutcome::failure(String::new(), ExecError::Wait(e)),
        };

        let mut output = (&mut self.stdout).await.unwrap_or_default();
        output.extend((&mut self.stderr).await.unwrap_or_default());
        let combined_output = String::from_utf8_lossy(&output).into_owned();

        match ExecError::from_status(status) {
            None => ExecutionOutcome::success(combined_output),
            Some(err) => ExecutionOutcome::failure(combined_output, err),
        }
    }

    /// Kill the script and every process in its group.
    pub fn terminate(&mut self) {
        self.kill_on_drop = false;
        #[cfg(unix)]
        {
            if let Some(pid) = self.child.id() {
                if let Err(e) = kill_process_group(pid) {
                    tracing::warn!(pid, error = %e, "Failed to kill script process group");
                }
            }
        }

        if let Err(e) = self.child.start_kill() {
            tracing::debug!(error = %e, "Script already exited");
        }
        self.stdout.abort();
        self.stderr.abort();
    }
}

impl Drop for ScriptProcess {
    fn drop(&mut self) {
        // `id()` is None once `wait` has reaped the child.
        if self.kill_on_drop && self.child.id().is_some() {
            tracing::warn!(pid = ?self.child.id(), "Script still running at shutdown, killing it");
            self.terminate();
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) -> std::io::Result<()> {
    // SAFETY: killpg only sends a signal. The child was spawned with
    // `process_group(0)`, so its pid is also its process group id.
    let ret = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Read an entire output stream, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        let _ = h.take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await;
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn script(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".sh").tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn collects_stdout_then_stderr() {
        let file = script("echo out\necho err >&2\n");
        let mut process = ScriptProcess::spawn(Path::new("/bin/sh"), file.path()).unwrap();

        let outcome = process.wait().await;
        assert_eq!(outcome, ExecutionOutcome::success("out\nerr\n".into()));
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_failure_with_output() {
        let file = script("echo partial\nexit 3\n");
        let mut process = ScriptProcess::spawn(Path::new("/bin/sh"), file.path()).unwrap();

        let outcome = process.wait().await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.combined_output, "partial\n");
        assert_eq!(outcome.error.as_deref(), Some("exit status 3"));
    }

    #[tokio::test]
    async fn missing_interpreter_fails_to_spawn() {
        let file = script("echo hi\n");
        let err = ScriptProcess::spawn(Path::new("/no/such/interpreter"), file.path())
            .err()
            .unwrap();
        assert!(matches!(err, ExecError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to start /no/such/interpreter"));
    }

    #[tokio::test]
    async fn dropping_a_running_script_kills_its_group() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let file = script(&format!("sleep 1\ntouch {}\n", marker.display()));

        let process = ScriptProcess::spawn(Path::new("/bin/sh"), file.path())
            .unwrap()
            .kill_on_drop(true);
        drop(process);

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn finished_script_is_not_signalled_on_drop() {
        let file = script("echo done\n");
        let mut process = ScriptProcess::spawn(Path::new("/bin/sh"), file.path())
            .unwrap()
            .kill_on_drop(true);

        assert!(process.wait().await.succeeded);
        assert!(process.id().is_none());
    }

    #[tokio::test]
    async fn terminate_kills_the_running_script() {
        let file = script("sleep 30\n");
        let mut process = ScriptProcess::spawn(Path::new("/bin/sh"), file.path()).unwrap();

        process.terminate();
        let status = tokio::time::timeout(std::time::Duration::from_secs(5), process.child.wait())
            .await
            .expect("killed script should be reaped promptly")
            .unwrap();
        assert!(!status.success());
    }
}
