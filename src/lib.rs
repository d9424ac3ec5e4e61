//! runfolder-clean - Illumina run folder cleanup
//!
//! Reclaims disk space from a completed MiSeq run folder by removing the
//! bulky intermediate directories (per-cycle basecalls, cluster locations,
//! InterOp metrics, logs, thumbnails) that are no longer needed once
//! real-time analysis has finished.
//!
//! ## Flow
//!
//! 1. [`preflight::validate_run_folder`] checks the folder exists, is
//!    accessible and carries the `RunInfo.xml` / `RTAComplete.txt` markers.
//! 2. [`disk_usage::DiskUsage::for_path`] snapshots the filesystem.
//! 3. [`purge::purge_run_folder`] walks the embedded purge table in order,
//!    reports per-directory counts and removes each directory wholesale.
//! 4. A second snapshot is taken and both are printed.
//!
//! Files with result extensions (`.fastq`, `.gz`, `.bam`, ...) are counted
//! and warned about but are NOT spared: every purge directory is removed in
//! full.

pub mod disk_usage;
pub mod preflight;
pub mod purge;
pub mod purge_table;

// Re-export commonly used items
pub use disk_usage::DiskUsage;
pub use preflight::{validate_run_folder, PreflightError, RTA_COMPLETE_MARKER, RUN_INFO_MARKER};
pub use purge::{
    purge_entry, purge_run_folder, EntryCensus, EntryReport, PurgeError, PurgeOptions,
    PurgeOutcome, PurgeReport,
};
pub use purge_table::{has_safe_extension, load_purge_table, PurgeEntry, PurgeTable};
