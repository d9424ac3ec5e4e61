//! Listing, census and removal of purge table entries.

use crate::purge_table::{has_safe_extension, PurgeEntry, PurgeTable};

use anyhow::{Context, Result};
use colored::Colorize;
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Options controlling purge behavior (runtime flags)
#[derive(Debug, Clone, Copy, Default)]
pub struct PurgeOptions {
    pub dry_run: bool,
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum PurgeError {
    /// Cannot happen while removable entries are a subset of the listing.
    /// Kept as a guard in case the census arithmetic changes.
    #[error("{removable} removable entries but only {total} listed in {entry}; refusing to continue")]
    CensusMismatch {
        entry: String,
        total: usize,
        removable: usize,
    },
}

/// Immediate children of a purge directory, split by extension
#[derive(Debug, Default)]
pub struct EntryCensus {
    pub total: usize,
    pub safe: Vec<PathBuf>,
    pub removable: Vec<PathBuf>,
}

impl EntryCensus {
    /// Split a listing into safe and removable paths
    pub fn from_listing(listing: Vec<PathBuf>, safe_extensions: &[String]) -> Self {
        let total = listing.len();
        let (safe, removable): (Vec<PathBuf>, Vec<PathBuf>) = listing
            .into_iter()
            .partition(|path| has_safe_extension(path, safe_extensions));
        EntryCensus {
            total,
            safe,
            removable,
        }
    }

    /// Sanity guard: removable entries can never outnumber the listing
    pub fn check(&self, entry: &PurgeEntry) -> Result<(), PurgeError> {
        if self.removable.len() > self.total {
            return Err(PurgeError::CensusMismatch {
                entry: entry.path.clone(),
                total: self.total,
                removable: self.removable.len(),
            });
        }
        Ok(())
    }
}

/// What happened to a single purge entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Removed,
    WouldRemove,
    /// The subpath was not there to begin with
    Missing,
}

#[derive(Debug)]
pub struct EntryReport {
    pub entry: PurgeEntry,
    pub path: PathBuf,
    pub listed: usize,
    pub safe: usize,
    pub outcome: PurgeOutcome,
}

/// Result of processing the whole purge table
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub entries: Vec<EntryReport>,
}

impl PurgeReport {
    pub fn count(&self, outcome: PurgeOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }
}

/// List the immediate, non-hidden children of a directory, sorted by name.
///
/// Hidden entries are skipped the same way a shell `*` glob skips them.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = result.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.depth() == 0 {
            continue;
        }
        entries.push(entry.into_path());
    }

    Ok(entries)
}

/// Build the census for one purge directory
pub fn take_census(dir: &Path, safe_extensions: &[String]) -> Result<EntryCensus> {
    let listing = list_entries(dir)?;
    Ok(EntryCensus::from_listing(listing, safe_extensions))
}

/// Remove a directory tree while showing a spinner
fn remove_tree(path: &Path) -> Result<()> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress bar template")?,
    );
    progress.set_message(format!("Removing {}", path.display()));
    progress.enable_steady_tick(Duration::from_millis(100));

    let result = fs::remove_dir_all(path);
    progress.finish_and_clear();

    result.with_context(|| format!("Failed to remove {}", path.display()))
}

/// Census, report and (unless dry run) remove one purge entry.
///
/// The whole subpath goes, safe-extension files included; the census only
/// feeds the report and the sanity guard.
pub fn purge_entry(
    run_root: &Path,
    entry: &PurgeEntry,
    safe_extensions: &[String],
    options: PurgeOptions,
) -> Result<EntryReport> {
    let path = entry.resolve(run_root);

    match fs::symlink_metadata(&path) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {
            println!("0 {}", entry.description);
            if options.dry_run {
                println!("Would run: rm -rf {}", path.display());
            }
            println!("  {} {}", "not present, skipping".yellow(), path.display());
            debug!(path = %path.display(), "purge entry missing");
            return Ok(EntryReport {
                entry: entry.clone(),
                path,
                listed: 0,
                safe: 0,
                outcome: PurgeOutcome::Missing,
            });
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Could not stat {}", path.display()));
        }
    }

    let census = take_census(&path, safe_extensions)?;
    census.check(entry)?;

    println!("{} {}", census.total, entry.description);

    if options.verbose {
        for item in &census.removable {
            println!("  > {}", item.display());
            debug!(path = %item.display(), safe = false, "listed entry");
        }
        for item in &census.safe {
            println!("  > {} {}", item.display(), "(result file)".cyan());
            debug!(path = %item.display(), safe = true, "listed entry");
        }
    }

    if !census.safe.is_empty() {
        warn!(
            entry = %entry.path,
            safe = census.safe.len(),
            "files with result extensions are removed together with their directory"
        );
    }

    let outcome = if options.dry_run {
        println!("Would run: rm -rf {}", path.display());
        PurgeOutcome::WouldRemove
    } else {
        remove_tree(&path)?;
        info!(path = %path.display(), entries = census.total, "removed");
        PurgeOutcome::Removed
    };

    Ok(EntryReport {
        entry: entry.clone(),
        path,
        listed: census.total,
        safe: census.safe.len(),
        outcome,
    })
}

/// Walk the purge table in order. The first error aborts the loop, leaving
/// later entries untouched.
pub fn purge_run_folder(
    run_root: &Path,
    table: &PurgeTable,
    options: PurgeOptions,
) -> Result<PurgeReport> {
    let mut report = PurgeReport::default();

    println!("{}", "Beginning removal".bold());
    println!("-----------------");

    for entry in &table.entries {
        let entry_report = purge_entry(run_root, entry, &table.safe_extensions, options)?;
        report.entries.push(entry_report);
    }

    println!("{}", "Done!".green());

    Ok(report)
}
