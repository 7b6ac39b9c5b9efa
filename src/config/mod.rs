//! Process-wide default for locating the Rscript executable.
//!
//! Every call can override the interpreter for just that call; this module
//! only holds the fallback used when no per-call command is given. Concurrent
//! reconfiguration is last-write-wins, nothing here is synchronized beyond
//! the lock itself.

use std::process::{Command, Stdio};
use std::sync::RwLock;

use lazy_static::lazy_static;

use crate::diag;

lazy_static! {
    static ref RSCRIPT: RwLock<String> = RwLock::new("Rscript".to_string());
}

/// Current process-wide Rscript command.
pub fn rscript() -> String {
    match RSCRIPT.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the process-wide Rscript command, then probe it.
///
/// An unusable command is reported as a warning on stderr, never as an
/// error: later calls will simply fail when they actually invoke it.
pub fn set_rscript(command: impl Into<String>) {
    let command = command.into();
    match RSCRIPT.write() {
        Ok(mut guard) => *guard = command.clone(),
        Err(poisoned) => *poisoned.into_inner() = command.clone(),
    }
    if !find_rscript(&command) {
        diag::warn(&format!(
            "'{command}' is not a valid Rscript command; set another with set_rscript(<command>)"
        ));
    }
}

/// Probe a candidate command by asking it for its version.
///
/// Only checks that the executable can be spawned; its exit status and
/// output are discarded.
pub fn find_rscript(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .status()
        .is_ok()
}

/// Validate the current process-wide command.
pub fn validate_rscript() -> bool {
    find_rscript(&rscript())
}
