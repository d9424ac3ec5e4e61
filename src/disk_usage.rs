//! Filesystem-level usage snapshots for before/after reporting.

use anyhow::{Context, Result};
use humansize::{format_size, BINARY};
use std::fmt;
use std::path::Path;

/// Total, used and free bytes of the filesystem holding a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    /// Space available to unprivileged users
    pub free: u64,
}

impl DiskUsage {
    /// Take a snapshot of the filesystem containing `path`
    #[cfg(unix)]
    pub fn for_path(path: &Path) -> Result<Self> {
        use nix::sys::statvfs::statvfs;

        let stats = statvfs(path)
            .with_context(|| format!("Failed to read filesystem stats for {}", path.display()))?;

        let fragment = u64::from(stats.fragment_size());
        let blocks = u64::from(stats.blocks());
        let blocks_free = u64::from(stats.blocks_free());
        let blocks_available = u64::from(stats.blocks_available());

        Ok(DiskUsage {
            total: blocks * fragment,
            used: blocks.saturating_sub(blocks_free) * fragment,
            free: blocks_available * fragment,
        })
    }

    #[cfg(not(unix))]
    pub fn for_path(path: &Path) -> Result<Self> {
        anyhow::bail!(
            "Filesystem stats are not supported on this platform ({})",
            path.display()
        )
    }

    /// Same values in binary units, e.g. "total=1.5 TiB, used=..., free=..."
    pub fn human(&self) -> String {
        format!(
            "total={}, used={}, free={}",
            format_size(self.total, BINARY),
            format_size(self.used, BINARY),
            format_size(self.free, BINARY)
        )
    }
}

impl fmt::Display for DiskUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "usage(total={}, used={}, free={})",
            self.total, self.used, self.free
        )
    }
}

/// Print both snapshots for the operator to compare
pub fn print_report(pre: &DiskUsage, post: &DiskUsage) {
    println!("\n");
    println!("Disk usage stats");
    println!("----------------");
    println!("pre : {}", pre);
    println!("      {}", pre.human());
    println!("post: {}", post);
    println!("      {}", post.human());
}
