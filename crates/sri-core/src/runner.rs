//! Execution boundary: where integrity values are actually computed.
//!
//! The controller never hashes on its own task. It hands `(path, algorithm)` to
//! a [`DigestRunner`] and awaits one typed result per request.

use crate::digest::{self, Algorithm, IntegrityResult};
use crate::error::DigestError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Computes one integrity value per call, off the controller's task.
pub trait DigestRunner: Send + Sync + 'static {
    fn run(
        &self,
        path: PathBuf,
        algorithm: Algorithm,
    ) -> impl Future<Output = Result<IntegrityResult, DigestError>> + Send;
}

/// Hashes on tokio's blocking pool inside the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessRunner;

impl DigestRunner for InProcessRunner {
    async fn run(&self, path: PathBuf, algorithm: Algorithm) -> Result<IntegrityResult, DigestError> {
        tokio::task::spawn_blocking(move || digest::integrity_of_path(&path, algorithm))
            .await
            .map_err(|e| DigestError::Spawn(std::io::Error::other(e)))?
    }
}

/// Spawns the `sri-gen` utility once per request and maps its exit status back
/// to a typed result.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl DigestRunner for ProcessRunner {
    async fn run(&self, path: PathBuf, algorithm: Algorithm) -> Result<IntegrityResult, DigestError> {
        let output = tokio::process::Command::new(&self.program)
            .arg(&path)
            .arg(algorithm.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(DigestError::Spawn)?;

        if !output.stderr.is_empty() {
            tracing::debug!(
                path = %path.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "sri-gen stderr"
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim_end();
        match output.status.code() {
            Some(0) if stdout.is_empty() => Err(DigestError::MissingInput),
            Some(0) => stdout.parse(),
            Some(code) => Err(DigestError::Unreadable {
                path,
                source: std::io::Error::other(format!("sri-gen exited with status {}", code)),
            }),
            None => Err(DigestError::Unreadable {
                path,
                source: std::io::Error::other("sri-gen terminated by signal"),
            }),
        }
    }
}
