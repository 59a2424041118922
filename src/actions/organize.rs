//! Type-based file organization with collision-safe naming.
//!
//! # Overview
//!
//! Each file is routed to `target_root/<category folder>` according to its
//! extension (see [`FileType`]). If a file with the same name already sits
//! there, a numeric suffix is appended to the stem (`photo_1.jpg`,
//! `photo_2.jpg`, ...) until a free name is found.
//!
//! Two modes share all of the planning logic:
//! - **Dry run** (default) returns the planned destination and touches
//!   nothing on disk
//! - **Execute** creates the category folder and moves the file
//!
//! Collision resolution looks at the filesystem in both modes. A dry run over
//! several files with the same name therefore plans the same destination
//! for each of them, because none of the earlier moves actually happened.
//!
//! # Example
//!
//! ```no_run
//! use strataoptima::actions::organize::organize;
//! use std::path::Path;
//!
//! let plan = organize(Path::new("Downloads/photo.jpg"), Path::new("organized"), true)?;
//! println!("would move to {}", plan.target_path.display());
//! # Ok::<(), strataoptima::actions::organize::OrganizeError>(())
//! ```

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use thiserror::Error;

use crate::scanner::{FileEntry, FileType, ScanError};

/// Default destination root, relative to the working directory.
pub const DEFAULT_TARGET_ROOT: &str = "organized";

/// Error type for organize operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Source file does not exist.
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// Source exists but is not a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Source metadata could not be read.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Category folder could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rename and the copy fallback both failed.
    #[error("Failed to move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other I/O error while inspecting the source.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    /// Get the source path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceNotFound(p)
            | Self::NotAFile(p)
            | Self::PermissionDenied(p)
            | Self::Io { path: p, .. }
            | Self::MoveFailed { from: p, .. } => Some(p),
            Self::CreateDirFailed { .. } => None,
        }
    }
}

impl From<ScanError> for OrganizeError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::NotFound(p) => Self::SourceNotFound(p),
            ScanError::NotAFile(p) => Self::NotAFile(p),
            ScanError::PermissionDenied(p) => Self::PermissionDenied(p),
            ScanError::Io { path, source } => Self::Io { path, source },
        }
    }
}

/// Whether a result is a plan or a completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeMode {
    /// Planned only; nothing was touched.
    DryRun,
    /// The file was moved.
    Executed,
}

/// Outcome of organizing one file.
#[derive(Debug, Clone)]
pub struct OrganizeResult {
    /// Metadata of the source as it was before organizing.
    pub source: FileEntry,
    /// Absolute destination path.
    pub target_path: PathBuf,
    /// Plan or completed move.
    pub mode: OrganizeMode,
}

impl OrganizeResult {
    /// True if nothing was moved.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.mode == OrganizeMode::DryRun
    }

    /// Category the source was routed to.
    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.source.file_type()
    }
}

/// Results of a batch organize operation.
#[derive(Debug, Clone, Default)]
pub struct BatchOrganizeResult {
    /// Files planned or moved.
    pub successes: Vec<OrganizeResult>,
    /// Failed files with their errors.
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchOrganizeResult {
    /// Number of files planned or moved.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed files.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted files.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if every file succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.successes.iter().any(|r| !r.is_dry_run()) {
            "Moved"
        } else {
            "Planned"
        };

        if self.all_succeeded() {
            format!("{} {} file(s)", verb, self.success_count())
        } else {
            format!(
                "{} {} file(s), {} failed",
                verb,
                self.success_count(),
                self.failure_count()
            )
        }
    }
}

/// Configuration for organize operations.
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    /// Root the category folders are created under.
    pub target_root: PathBuf,
    /// Plan without touching the filesystem.
    pub dry_run: bool,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            target_root: PathBuf::from(DEFAULT_TARGET_ROOT),
            dry_run: true,
        }
    }
}

impl OrganizeConfig {
    /// Create a dry-run config for the given root.
    #[must_use]
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
            dry_run: true,
        }
    }

    /// Plan only (`true`) or move files (`false`).
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Callback trait for organize progress reporting.
pub trait OrganizeProgressCallback: Send + Sync {
    /// Called before each file.
    fn on_before_organize(&self, path: &Path, index: usize, total: usize);

    /// Called after a file was planned or moved.
    fn on_organize_success(&self, result: &OrganizeResult);

    /// Called after a file failed.
    fn on_organize_failure(&self, path: &Path, error: &str);

    /// Called when the batch completes.
    fn on_complete(&self, result: &BatchOrganizeResult);
}

/// Pick a destination in `dir` that no existing file occupies.
///
/// Returns `dir/file_name` if it is free. Otherwise appends `_1`, `_2`, ...
/// to the stem, keeping the extension, and returns the first free name.
/// Stem and extension follow [`Path::file_stem`] and [`Path::extension`]:
/// `a.tar.gz` becomes `a.tar_1.gz` and `.bashrc` becomes `.bashrc_1`.
#[must_use]
pub fn resolve_collision(dir: &Path, file_name: &OsStr) -> PathBuf {
    let candidate = dir.join(file_name);
    if !is_occupied(&candidate) {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let extension = name.extension();

    let mut counter: u64 = 1;
    loop {
        let mut next = stem.to_os_string();
        next.push(format!("_{counter}"));
        if let Some(ext) = extension {
            next.push(".");
            next.push(ext);
        }

        let candidate = dir.join(&next);
        if !is_occupied(&candidate) {
            log::debug!(
                "Name collision for {} resolved as {}",
                name.display(),
                candidate.display()
            );
            return candidate;
        }
        counter += 1;
    }
}

// Dangling symlinks count as occupied.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Organize one file into its category folder under `target_root`.
///
/// With `dry_run` the destination is computed and returned without creating
/// folders or moving anything.
///
/// # Errors
///
/// - `SourceNotFound` if `source` does not exist
/// - `NotAFile` if `source` is not a regular file
/// - `CreateDirFailed` if the category folder can't be created
/// - `MoveFailed` if the file can't be moved
pub fn organize(
    source: &Path,
    target_root: &Path,
    dry_run: bool,
) -> Result<OrganizeResult, OrganizeError> {
    let entry = FileEntry::from_path(source)?;
    let file_type = entry.file_type();

    let root = std::path::absolute(target_root).map_err(|e| OrganizeError::Io {
        path: target_root.to_path_buf(),
        source: e,
    })?;
    let dest_dir = root.join(file_type.folder_name());

    let file_name = entry
        .path
        .file_name()
        .ok_or_else(|| OrganizeError::NotAFile(entry.path.clone()))?;
    let target_path = resolve_collision(&dest_dir, file_name);

    if dry_run {
        log::debug!(
            "Would move {} -> {}",
            entry.path.display(),
            target_path.display()
        );
        return Ok(OrganizeResult {
            source: entry,
            target_path,
            mode: OrganizeMode::DryRun,
        });
    }

    fs::create_dir_all(&dest_dir).map_err(|e| {
        log::error!("Failed to create {}: {}", dest_dir.display(), e);
        OrganizeError::CreateDirFailed {
            path: dest_dir.clone(),
            source: e,
        }
    })?;

    move_file(&entry.path, &target_path)?;

    log::info!(
        "Moved {} -> {}",
        entry.path.display(),
        target_path.display()
    );

    Ok(OrganizeResult {
        source: entry,
        target_path,
        mode: OrganizeMode::Executed,
    })
}

/// Rename, falling back to copy + remove when rename is not possible.
fn move_file(from: &Path, to: &Path) -> Result<(), OrganizeError> {
    let rename_error = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    log::debug!(
        "Rename {} -> {} failed ({}), copying instead",
        from.display(),
        to.display(),
        rename_error
    );

    copy_then_remove(from, to)
}

/// Copy `from` to `to` keeping its modification time, then remove `from`.
fn copy_then_remove(from: &Path, to: &Path) -> Result<(), OrganizeError> {
    let move_failed = |source: io::Error| OrganizeError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(from).map_err(move_failed)?;
    fs::copy(from, to).map_err(move_failed)?;

    let mtime = FileTime::from_last_modification_time(&metadata);
    if let Err(e) = filetime::set_file_mtime(to, mtime) {
        log::warn!(
            "Failed to carry modification time over to {}: {}",
            to.display(),
            e
        );
    }

    if let Err(e) = fs::remove_file(from) {
        // Leave exactly one copy behind
        if let Err(cleanup) = fs::remove_file(to) {
            log::warn!(
                "Failed to remove partial copy {}: {}",
                to.display(),
                cleanup
            );
        }
        return Err(move_failed(e));
    }

    Ok(())
}

/// Organize every file in order, collecting successes and failures.
///
/// A failure is recorded and the batch moves on to the next file.
pub fn organize_batch<C: OrganizeProgressCallback + ?Sized>(
    files: &[PathBuf],
    config: &OrganizeConfig,
    callback: Option<&C>,
) -> BatchOrganizeResult {
    let mut result = BatchOrganizeResult::default();
    let total = files.len();

    log::info!(
        "Organizing {} file(s) into {} ({})",
        total,
        config.target_root.display(),
        if config.dry_run { "dry run" } else { "execute" }
    );

    for (index, path) in files.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_before_organize(path, index, total);
        }

        match organize(path, &config.target_root, config.dry_run) {
            Ok(outcome) => {
                if let Some(cb) = callback {
                    cb.on_organize_success(&outcome);
                }
                result.successes.push(outcome);
            }
            Err(e) => {
                let error_msg = e.to_string();
                log::warn!("Failed to organize {}: {}", path.display(), error_msg);

                if let Some(cb) = callback {
                    cb.on_organize_failure(path, &error_msg);
                }

                result.failures.push((path.clone(), error_msg));
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());

    result
}
