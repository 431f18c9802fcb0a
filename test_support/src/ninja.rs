//! Drive the system `ninja` binary against generated files.

use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Output};
use tempfile::TempDir;
use thiserror::Error;

/// Errors raised while running Ninja in a scratch directory.
#[derive(Error, Debug)]
pub enum NinjaWorkspaceError {
    /// `ninja` could not be spawned, most likely because it is not on `PATH`.
    #[error("failed to spawn ninja: {0}")]
    Spawn(#[source] io::Error),
    /// `ninja` ran but exited unsuccessfully.
    #[error("ninja exited with {status}: {stderr}")]
    Failed {
        /// Exit status.
        status: ExitStatus,
        /// Captured standard error.
        stderr: String,
    },
    /// The scratch directory or a file in it could not be prepared.
    #[error("failed to prepare ninja workspace: {0}")]
    Workspace(#[source] io::Error),
}

fn checked(output: Output) -> Result<String, NinjaWorkspaceError> {
    if !output.status.success() {
        return Err(NinjaWorkspaceError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// A scratch directory holding `build.ninja`, available only when a working
/// `ninja` is installed. Callers skip their scenario on `Err`.
///
/// # Errors
///
/// Returns an error if `ninja --version` fails or the directory cannot be
/// created.
pub fn ninja_integration_workspace() -> Result<TempDir, NinjaWorkspaceError> {
    let probe = Command::new("ninja")
        .arg("--version")
        .output()
        .map_err(NinjaWorkspaceError::Spawn)?;
    checked(probe)?;
    TempDir::new().map_err(NinjaWorkspaceError::Workspace)
}

/// Write `ninja_text` to `build.ninja` in `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_build_ninja(dir: &Path, ninja_text: &str) -> Result<(), NinjaWorkspaceError> {
    fs::write(dir.join("build.ninja"), ninja_text).map_err(NinjaWorkspaceError::Workspace)
}

/// Run `ninja` with `args` in `dir` and return its standard output.
///
/// # Errors
///
/// Returns an error if `ninja` cannot be spawned or exits unsuccessfully.
pub fn run_ninja(dir: &Path, args: &[&str]) -> Result<String, NinjaWorkspaceError> {
    let output = Command::new("ninja")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(NinjaWorkspaceError::Spawn)?;
    checked(output)
}
