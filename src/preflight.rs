//! Run folder validation before anything is deleted.
//!
//! Checks run in a fixed order: the path must exist before its access is
//! tested, and must be accessible before the marker files are looked up.

use colored::Colorize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Written by the instrument when the run starts
pub const RUN_INFO_MARKER: &str = "RunInfo.xml";
/// Written by real-time analysis once basecalling has finished
pub const RTA_COMPLETE_MARKER: &str = "RTAComplete.txt";

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("{} does not exist (or cannot be found)", .0.display())]
    Missing(PathBuf),

    #[error("Cannot access {}", .0.display())]
    Inaccessible(PathBuf),

    #[error("Could not find RunInfo.xml -- is this an illumina run folder?")]
    NotRunFolder(PathBuf),

    #[error("Could not find RTAComplete.txt -- cleaning up could damage in-progress analysis")]
    RunIncomplete(PathBuf),
}

/// Check that the path exists at all
pub fn check_exists(path: &Path) -> Result<(), PreflightError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PreflightError::Missing(path.to_path_buf()))
    }
}

/// Check that the process may read, write and traverse the path
pub fn check_access(path: &Path) -> Result<(), PreflightError> {
    if has_full_access(path) {
        Ok(())
    } else {
        Err(PreflightError::Inaccessible(path.to_path_buf()))
    }
}

/// Check for the two marker files of a completed run
pub fn check_markers(path: &Path) -> Result<(), PreflightError> {
    if !path.join(RUN_INFO_MARKER).exists() {
        return Err(PreflightError::NotRunFolder(path.to_path_buf()));
    }
    if !path.join(RTA_COMPLETE_MARKER).exists() {
        return Err(PreflightError::RunIncomplete(path.to_path_buf()));
    }
    Ok(())
}

/// Run every check in order, printing a status line for each.
///
/// Stops at the first failure.
pub fn validate_run_folder(path: &Path) -> Result<(), PreflightError> {
    let mut out = io::stdout();
    run_check(&mut out, "Testing path exists...", || check_exists(path))?;
    run_check(&mut out, "Testing access...", || check_access(path))?;
    run_check(&mut out, "Looking at run folder...", || check_markers(path))?;
    writeln!(out).ok();
    Ok(())
}

/// Print the label, flushed so it shows while a slow check runs, then the verdict
fn run_check<W: Write>(
    out: &mut W,
    label: &str,
    check: impl FnOnce() -> Result<(), PreflightError>,
) -> Result<(), PreflightError> {
    write!(out, "{}", label).ok();
    out.flush().ok();
    match check() {
        Ok(()) => {
            writeln!(out, "{}", "ok".green()).ok();
            Ok(())
        }
        Err(err) => {
            writeln!(out, "{}", "failed".red()).ok();
            Err(err)
        }
    }
}

#[cfg(unix)]
fn has_full_access(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};

    access(path, AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn has_full_access(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => !metadata.permissions().readonly() && std::fs::read_dir(path).is_ok(),
        Err(_) => false,
    }
}
