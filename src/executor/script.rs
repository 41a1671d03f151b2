//! Pre-flight checks on the configured script.
//!
//! Nothing here spawns a process: a trigger that fails these checks is
//! answered without touching the interpreter.

use std::path::{Path, PathBuf};

/// Why the configured script cannot be run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("the shell file should not empty")]
    EmptyPath,

    #[error("the shell file is not shell script")]
    NotAScript,

    #[error("shell file: {0} not exist")]
    Unreadable(String),
}

/// Validate the configured path and resolve it for the interpreter.
///
/// The file must carry `extension` and be a readable, non-empty file.
/// Relative paths are resolved against the current working directory.
pub async fn prepare(configured: &Path, extension: &str) -> Result<PathBuf, ScriptError> {
    if configured.as_os_str().is_empty() {
        return Err(ScriptError::EmptyPath);
    }

    if configured.extension().and_then(|ext| ext.to_str()) != Some(extension) {
        return Err(ScriptError::NotAScript);
    }

    let unreadable = || ScriptError::Unreadable(configured.display().to_string());
    let file = tokio::fs::File::open(configured).await.map_err(|_| unreadable())?;
    let metadata = file.metadata().await.map_err(|_| unreadable())?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Err(unreadable());
    }

    Ok(resolve(configured))
}

/// Absolute paths pass through; relative ones are joined onto the working directory.
pub fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot read working directory, using script path as given");
            path.to_path_buf()
        }
    }
}
