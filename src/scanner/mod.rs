//! File discovery, content digests and type classification.
//!
//! The pieces are independent leaves used by [`crate::duplicates`] and
//! [`crate::actions`]:
//! - [`walker`]: recursive crawl producing [`FileEntry`] snapshots
//! - [`hasher`]: streaming MD5 / SHA-1 / SHA-256 digests
//! - [`file_type`]: extension-to-category lookup
//!
//! # Example
//!
//! ```no_run
//! use strataoptima::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let hasher = Hasher::default();
//! for file in walker.collect_files() {
//!     println!("{}  {}", hasher.fingerprint(&file.path), file.path.display());
//! }
//! ```

pub mod file_type;
pub mod hasher;
pub mod walker;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Re-export main types
pub use file_type::FileType;
pub use hasher::{HashAlgorithm, Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::{crawl, Walker};

/// Metadata for a discovered regular file.
///
/// A read-only snapshot of filesystem metadata. Nothing owns the file it
/// describes; use [`FileEntry::from_path`] to re-resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Location of the file, absolute when produced by the crawler
    pub path: PathBuf,
    /// Length in bytes at snapshot time
    pub size: u64,
    /// Modification time at snapshot time
    pub modified: SystemTime,
}

impl FileEntry {
    /// Build an entry from known values without touching the filesystem.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }

    /// Resolve a path into a `FileEntry` from its current metadata.
    ///
    /// The stored path is made absolute. Symbolic links are followed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path does not exist
    /// - `NotAFile` if the path is not a regular file
    /// - `Io` for any other metadata failure
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_file() {
            return Err(ScanError::NotAFile(path.to_path_buf()));
        }

        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self::with_metadata(absolute, &metadata))
    }

    /// Build an entry from a path and metadata already in hand.
    pub(crate) fn with_metadata(path: PathBuf, metadata: &fs::Metadata) -> Self {
        Self {
            path,
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    /// Final path component as a lossy string.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Category this file is routed to when organizing.
    #[must_use]
    pub fn file_type(&self) -> FileType {
        FileType::from_path(&self.path)
    }
}

/// Which files a crawl reports.
///
/// The default walk reports every regular file under the root, including
/// hidden and empty files.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend through symbolic links. Cycles are not detected.
    pub follow_symlinks: bool,

    /// Leave out entries whose name starts with `.`.
    pub skip_hidden: bool,

    /// Gitignore-style lines matched relative to the root.
    pub ignore_patterns: Vec<String>,

    /// Restrict the walk to these categories. Empty means all.
    pub file_types: Vec<FileType>,
}

impl WalkerConfig {
    /// Configuration with no type restriction.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
            file_types: Vec::new(),
        }
    }

    /// Restrict the walk to the given categories.
    #[must_use]
    pub fn with_file_types(mut self, file_types: Vec<FileType>) -> Self {
        self.file_types = file_types;
        self
    }
}

/// Failure to resolve or walk a path.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Metadata could not be read for lack of permission.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Nothing exists at the path.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read a file's content for digesting.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file is gone.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// The file could not be opened for reading.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A read failed part way through.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
