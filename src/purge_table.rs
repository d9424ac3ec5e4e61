//! Purge table loading and safe-extension matching from purge.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// A subdirectory of the run folder that is removed wholesale
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PurgeEntry {
    /// Path relative to the run folder root, POSIX separators
    pub path: String,
    /// Human-readable description, printed after the entry count
    pub description: String,
}

impl PurgeEntry {
    /// Join this entry under the run folder root
    pub fn resolve(&self, run_root: &Path) -> PathBuf {
        self.path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(run_root.to_path_buf(), |acc, part| acc.join(part))
    }
}

/// The fixed purge table plus the list of result-file extensions
#[derive(Debug, Clone)]
pub struct PurgeTable {
    pub entries: Vec<PurgeEntry>,
    /// Extensions including the leading dot, e.g. ".fastq"
    pub safe_extensions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PurgeConfig {
    purge: Vec<PurgeEntry>,
    safe: SafeConfig,
}

#[derive(Debug, Deserialize)]
struct SafeConfig {
    extensions: Vec<String>,
}

// Embed the TOML file directly in the binary at compile time
const PURGE_TOML: &str = include_str!("../purge.toml");

/// Parse a purge table from TOML text, rejecting entries that could escape the run root
pub fn parse_purge_table(content: &str) -> Result<PurgeTable> {
    let config: PurgeConfig = toml::from_str(content).context("Failed to parse purge table")?;

    for entry in &config.purge {
        if !is_contained_relative(&entry.path) {
            anyhow::bail!(
                "Purge table entry '{}' must be a relative path inside the run folder",
                entry.path
            );
        }
    }

    for ext in &config.safe.extensions {
        if !ext.starts_with('.') {
            anyhow::bail!("Safe extension '{}' must include the leading dot", ext);
        }
    }

    Ok(PurgeTable {
        entries: config.purge,
        safe_extensions: config.safe.extensions,
    })
}

/// Load the purge table compiled into the binary
pub fn load_purge_table() -> Result<PurgeTable> {
    parse_purge_table(PURGE_TOML).context("Embedded purge.toml is invalid")
}

/// True if the path only has normal components (no root, prefix, `.` or `..`)
fn is_contained_relative(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Extension of the final path component, with its leading dot.
///
/// Leading dots of the file name are skipped before looking for a suffix,
/// so `.bashrc` has no extension while `reads.fastq.gz` yields `.gz` and
/// `name.` yields `.`.
pub fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let stem_start = name.len() - name.trim_start_matches('.').len();
    let rest = &name[stem_start..];
    rest.rfind('.').map(|pos| rest[pos..].to_string())
}

/// Check whether a path carries one of the safe extensions (exact, case-sensitive)
pub fn has_safe_extension(path: &Path, safe_extensions: &[String]) -> bool {
    match extension_of(path) {
        Some(ext) => safe_extensions.iter().any(|safe| *safe == ext),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_loads_in_order() {
        let table = load_purge_table().unwrap();
        let paths: Vec<&str> = table.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "Data/Intensities/BaseCalls/L001",
                "Data/Intensities/BaseCalls/Matrix",
                "Data/Intensities/BaseCalls/Phasing",
                "Data/Intensities/L001",
                "Data/Intensities/Offsets",
                "Data/RTALogs",
                "Data/TileStatus",
                "InterOp",
                "Logs",
                "Thumbnail_Images",
            ]
        );
        assert_eq!(table.entries[8].description, "raw log files");
        assert_eq!(table.entries[7].description, "interop binary files");
    }

    #[test]
    fn test_embedded_safe_extensions() {
        let table = load_purge_table().unwrap();
        assert_eq!(
            table.safe_extensions,
            vec![".fastq", ".fq", ".gz", ".bam", ".csv"]
        );
        // Logs/ is full of XML that must be purged
        assert!(!table.safe_extensions.iter().any(|e| e == ".xml"));
    }

    #[test]
    fn test_extension_of_last_suffix_only() {
        assert_eq!(extension_of(Path::new("reads.fastq.gz")).as_deref(), Some(".gz"));
        assert_eq!(extension_of(Path::new("/a/b/sample.bam")).as_deref(), Some(".bam"));
        assert_eq!(extension_of(Path::new("C100.1")).as_deref(), Some(".1"));
        assert_eq!(extension_of(Path::new("Makefile")), None);
    }

    #[test]
    fn test_extension_of_leading_and_trailing_dots() {
        assert_eq!(extension_of(Path::new(".gz")), None);
        assert_eq!(extension_of(Path::new("..hidden")), None);
        assert_eq!(extension_of(Path::new(".hidden.csv")).as_deref(), Some(".csv"));
        assert_eq!(extension_of(Path::new("trailing.")).as_deref(), Some("."));
    }

    #[test]
    fn test_has_safe_extension() {
        let safe = load_purge_table().unwrap().safe_extensions;
        assert!(has_safe_extension(Path::new("x/reads.fastq.gz"), &safe));
        assert!(has_safe_extension(Path::new("x/SampleSheet.csv"), &safe));
        assert!(has_safe_extension(Path::new("x/r1.fq"), &safe));
        assert!(!has_safe_extension(Path::new("x/archive.tar"), &safe));
        assert!(!has_safe_extension(Path::new("x/RunInfo.xml"), &safe));
        // Case-sensitive match
        assert!(!has_safe_extension(Path::new("x/READS.FASTQ"), &safe));
    }

    #[test]
    fn test_resolve_joins_under_root() {
        let entry = PurgeEntry {
            path: "Data/Intensities/L001".to_string(),
            description: ".locs files".to_string(),
        };
        let resolved = entry.resolve(Path::new("/runs/run1"));
        assert_eq!(resolved, Path::new("/runs/run1/Data/Intensities/L001"));
    }

    #[test]
    fn test_parse_rejects_escaping_paths() {
        for bad in ["../outside", "/abs/path", "Data/../../x", "./Logs", ""] {
            let toml = format!(
                "[[purge]]\npath = \"{}\"\ndescription = \"x\"\n[safe]\nextensions = []\n",
                bad
            );
            let result = parse_purge_table(&toml);
            assert!(result.is_err(), "expected '{}' to be rejected", bad);
        }
    }

    #[test]
    fn test_parse_rejects_extension_without_dot() {
        let toml = "[[purge]]\npath = \"Logs\"\ndescription = \"x\"\n[safe]\nextensions = [\"csv\"]\n";
        let err = parse_purge_table(toml).unwrap_err();
        assert!(err.to_string().contains("leading dot"));
    }
}
