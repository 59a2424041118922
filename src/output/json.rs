//! JSON reports for analyze and organize runs.
//!
//! # Analysis schema
//!
//! ```json
//! {
//!   "root": "/data",
//!   "algorithm": "md5",
//!   "generated_at": "2024-05-01T12:00:00+00:00",
//!   "duplicates": [
//!     {
//!       "hash": "5d41402abc4b2a76b9719d911017c592",
//!       "wasted_bytes": 5,
//!       "original": { "path": "/data/a.txt", "size": 5, "modified": "..." },
//!       "copies": [{ "path": "/data/b.txt", "size": 5, "modified": "..." }]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 2,
//!     "total_size": 10,
//!     "unhashable_files": 0,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "wasted_space": 5,
//!     "scan_duration_ms": 3,
//!     "exit_code": 0,
//!     "exit_code_name": "SO000"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::sorted_groups;
use crate::actions::organize::{BatchOrganizeResult, OrganizeResult};
use crate::duplicates::{DuplicateGroup, DuplicateMap, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::{FileEntry, HashAlgorithm};

/// A single file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time, RFC 3339 in UTC
    pub modified: String,
}

impl From<&FileEntry> for JsonFile {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: path_string(&entry.path),
            size: entry.size,
            modified: rfc3339(entry.modified),
        }
    }
}

/// One group: the original plus its copies.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Lower-case hex digest
    pub hash: String,
    /// Bytes taken by the copies
    pub wasted_bytes: u64,
    /// Earliest-modified member
    pub original: JsonFile,
    /// Remaining members, oldest first
    pub copies: Vec<JsonFile>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash.clone(),
            wasted_bytes: group.total_size(),
            original: JsonFile::from(&group.original),
            copies: group.copies.iter().map(JsonFile::from).collect(),
        }
    }
}

/// Totals block of the analysis report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files considered
    pub total_files: usize,
    /// Total size of all considered files in bytes
    pub total_size: u64,
    /// Files whose content could not be read
    pub unhashable_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Copies across all groups
    pub duplicate_files: usize,
    /// Bytes taken by copies
    pub wasted_space: u64,
    /// Wall time in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "SO000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            unhashable_files: summary.unhashable_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            wasted_space: summary.wasted_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete analysis report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Directory that was scanned
    pub root: String,
    /// Digest algorithm used
    pub algorithm: HashAlgorithm,
    /// Report creation time, RFC 3339
    pub generated_at: String,
    /// Duplicate groups, most wasted bytes first
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Totals
    pub summary: JsonSummary,
}

impl AnalysisReport {
    /// Build the report for one analyze run.
    #[must_use]
    pub fn new(
        root: &Path,
        algorithm: HashAlgorithm,
        groups: &DuplicateMap,
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            root: path_string(root),
            algorithm,
            generated_at: Utc::now().to_rfc3339(),
            duplicates: sorted_groups(groups)
                .into_iter()
                .map(JsonDuplicateGroup::from)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Single-line JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (not expected for these types).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (not expected for these types).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_json(writer, &self.to_json_pretty()?)
    }
}

/// One planned or completed move.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOrganizeEntry {
    /// Source path before the move
    pub source: String,
    /// Absolute destination path
    pub target: String,
    /// Category folder the file was routed to
    pub category: String,
    /// Size in bytes
    pub size: u64,
    /// True when the file was actually moved
    pub moved: bool,
}

impl From<&OrganizeResult> for JsonOrganizeEntry {
    fn from(result: &OrganizeResult) -> Self {
        Self {
            source: path_string(&result.source.path),
            target: path_string(&result.target_path),
            category: result.file_type().folder_name().to_string(),
            size: result.source.size,
            moved: !result.is_dry_run(),
        }
    }
}

/// A file that could not be organized.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOrganizeFailure {
    /// Source path
    pub path: String,
    /// Error message
    pub error: String,
}

/// Organize summary in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOrganizeSummary {
    /// Files attempted
    pub total: usize,
    /// Files planned or moved
    pub succeeded: usize,
    /// Files that failed
    pub failed: usize,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name
    pub exit_code_name: String,
}

/// Complete organize report.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    /// Directory the files came from
    pub source_root: String,
    /// Root the category folders live under
    pub target_root: String,
    /// True if nothing was moved
    pub dry_run: bool,
    /// Report creation time, RFC 3339
    pub generated_at: String,
    /// Planned or completed moves, in processing order
    pub organized: Vec<JsonOrganizeEntry>,
    /// Failed files, in processing order
    pub failures: Vec<JsonOrganizeFailure>,
    /// Counts
    pub summary: JsonOrganizeSummary,
}

impl OrganizeReport {
    /// Build the report for one organize run.
    #[must_use]
    pub fn new(
        source_root: &Path,
        target_root: &Path,
        dry_run: bool,
        result: &BatchOrganizeResult,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            source_root: path_string(source_root),
            target_root: path_string(target_root),
            dry_run,
            generated_at: Utc::now().to_rfc3339(),
            organized: result.successes.iter().map(JsonOrganizeEntry::from).collect(),
            failures: result
                .failures
                .iter()
                .map(|(path, error)| JsonOrganizeFailure {
                    path: path_string(path),
                    error: error.clone(),
                })
                .collect(),
            summary: JsonOrganizeSummary {
                total: result.total_count(),
                succeeded: result.success_count(),
                failed: result.failure_count(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (not expected for these types).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_json(writer, &self.to_json_pretty()?)
    }
}

fn write_json<W: Write>(writer: &mut W, json: &str) -> Result<(), JsonOutputError> {
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

/// Failure to produce a JSON report.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
