//! Synchronous invocation of Rscript against a composed script file.
//!
//! The script always goes through a file, never through `-e`: inline code
//! hits shell quoting and argument-length limits once data paths and user
//! code get long. Blocking by design; there is no timeout and no retry.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::error::GgError;

#[derive(Debug, Clone)]
pub(crate) struct RunOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Write `script` to a scratch file and run `<command> <scriptfile>`,
/// capturing both streams. The scratch directory is removed when this
/// returns, on every path.
pub(crate) fn run_script(command: &str, script: &str) -> Result<RunOutput, GgError> {
    let dir = TempDir::new()?;
    let path = dir.path().join("__ggscript.R");
    fs::write(&path, script)?;
    run_file(command, &path)
}

fn run_file(command: &str, script_path: &Path) -> Result<RunOutput, GgError> {
    let output = Command::new(command)
        .arg(script_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| GgError::InterpreterNotFound {
            command: command.to_string(),
            source,
        })?;
    Ok(RunOutput {
        status: output.status.code().unwrap_or(-1),
        // Streams are decoded leniently; R packages are chatty in whatever
        // locale encoding they feel like.
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
