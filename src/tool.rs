//! Helpers for locating and running external programs.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Locate a program on `PATH`.
pub fn find_program(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => Some(path),
        Err(_) => {
            log::debug!("{} not found on PATH", name);
            None
        }
    }
}

/// Run a command to completion and return its stdout.
///
/// A non-zero exit status is an [`Error::Tool`] carrying the first line of stderr.
pub fn run_captured(command: &mut Command) -> Result<Vec<u8>> {
    log::debug!("Running {:?}", command);

    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::Tool {
            program: program.clone(),
            message: format!("failed to start: {}", e),
        })?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no error output");
        Err(Error::Tool {
            program,
            message: format!("{} ({})", output.status, detail),
        })
    }
}

/// Check that a command runs and exits successfully, discarding its output.
pub fn probe(command: &mut Command) -> bool {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
