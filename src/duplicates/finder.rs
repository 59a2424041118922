//! Duplicate finder: parallel digesting and pipeline orchestration.
//!
//! # Overview
//!
//! This module drives the duplicate detection pipeline:
//! 1. **Walk** (optional) - Collect regular files under a root
//! 2. **Digest** - Hash every file on a bounded rayon pool, batch by batch
//! 3. **Group** - Partition by digest (see [`crate::duplicates::groups`])
//!
//! Digesting runs in fixed-size batches. Each batch is handed to a pool of
//! `io_threads` workers and fully collected before the next one starts, so
//! at most `min(io_threads, batch_size)` files are open at once.
//!
//! # Example
//!
//! ```no_run
//! use strataoptima::duplicates::{DuplicateFinder, FinderConfig};
//! use strataoptima::scanner::HashAlgorithm;
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_algorithm(HashAlgorithm::Sha256);
//! let finder = DuplicateFinder::new(config);
//!
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//! let (groups, summary) = finder.find(&paths);
//!
//! println!("{} groups, {} bytes reclaimable", groups.len(), summary.wasted_space);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_hash, DuplicateMap};
use crate::progress::ProgressCallback;
use crate::scanner::{
    FileEntry, HashAlgorithm, Hasher, Walker, WalkerConfig, DEFAULT_BUFFER_SIZE,
};

/// Default number of hashing workers.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Default number of files submitted to the pool per batch.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Settings for one duplicate search.
#[derive(Clone)]
pub struct FinderConfig {
    /// Digest function.
    pub algorithm: HashAlgorithm,
    /// Hashing workers in the dedicated pool.
    pub io_threads: usize,
    /// Files per batch. A batch finishes before the next one is submitted.
    pub batch_size: usize,
    /// Read buffer size for the digest engine.
    pub buffer_size: usize,
    /// Walker settings used by [`DuplicateFinder::scan_directory`].
    pub walker_config: WalkerConfig,
    /// Receives phase and per-file events.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("algorithm", &self.algorithm)
            .field("io_threads", &self.io_threads)
            .field("batch_size", &self.batch_size)
            .field("buffer_size", &self.buffer_size)
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            io_threads: DEFAULT_IO_THREADS,
            batch_size: DEFAULT_BATCH_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            walker_config: WalkerConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the batch size (at least 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the digest read buffer size (at least 1).
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Digest every file, returning one `(file, digest)` pair per input.
///
/// Output order matches input order. Files that cannot be read get the empty
/// digest. Batches of `config.batch_size` files are hashed on a dedicated
/// pool of `config.io_threads` workers; each batch completes before the
/// next is submitted and all batches complete before this returns.
#[must_use]
pub fn digest_all(
    files: Vec<FileEntry>,
    hasher: &Hasher,
    config: &FinderConfig,
) -> Vec<(FileEntry, String)> {
    let total = files.len();
    let batch_size = config.batch_size.max(1);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", total);
    }

    log::info!(
        "Hashing {} files with {} ({} threads, batches of {})",
        total,
        hasher.algorithm(),
        config.io_threads,
        batch_size
    );

    // At most io_threads files are open at a time
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!(
                "Failed to create hashing pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            None
        }
    };

    let processed = AtomicUsize::new(0);
    let mut results = Vec::with_capacity(total);
    let mut remaining = files.into_iter();

    loop {
        let batch: Vec<FileEntry> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }

        log::trace!("Submitting batch of {} files", batch.len());

        let hashed = match pool {
            Some(ref pool) => pool.install(|| hash_batch(batch, hasher, config, &processed)),
            None => hash_batch(batch, hasher, config, &processed),
        };
        results.extend(hashed);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    log::debug!("Hashing complete: {} digests", results.len());
    results
}

/// Hash one batch in parallel on the current rayon pool.
fn hash_batch(
    batch: Vec<FileEntry>,
    hasher: &Hasher,
    config: &FinderConfig,
    processed: &AtomicUsize,
) -> Vec<(FileEntry, String)> {
    batch
        .into_par_iter()
        .map(|file| {
            let digest = hasher.fingerprint(&file.path);

            if let Some(ref callback) = config.progress_callback {
                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                callback.on_progress(current, file.path.to_string_lossy().as_ref());
                callback.on_item_completed(file.size);
            }

            (file, digest)
        })
        .collect()
}

/// Totals for one duplicate search.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files considered
    pub total_files: usize,
    /// Total size of all considered files in bytes
    pub total_size: u64,
    /// Files whose content could not be read
    pub unhashable_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Copies across all groups, originals not counted
    pub duplicate_files: usize,
    /// Bytes taken by copies
    pub wasted_space: u64,
    /// Wall time from start to grouped result
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of the considered bytes taken by copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.wasted_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Wasted space as a human-readable string.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        ByteSize::b(self.wasted_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur when scanning a directory for duplicates.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Nothing exists at the root.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The root is a file or other non-directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Duplicate finder composing the digest and grouping stages.
///
/// # Example
///
/// ```no_run
/// use strataoptima::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.scan_directory(Path::new(".")) {
///     Ok((groups, summary)) => {
///         println!("Found {} duplicate groups", groups.len());
///         println!("Can reclaim {}", summary.wasted_display());
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Finder whose digest engine follows `config`.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new(config.algorithm).with_buffer_size(config.buffer_size);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration (MD5).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicates among the given paths.
    ///
    /// Each path is resolved to a [`FileEntry`]; paths that are missing or
    /// are not regular files are skipped.
    #[must_use]
    pub fn find(&self, paths: &[PathBuf]) -> (DuplicateMap, ScanSummary) {
        let entries: Vec<FileEntry> = paths
            .iter()
            .filter_map(|path| match FileEntry::from_path(path) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        if entries.len() < paths.len() {
            log::info!(
                "Resolved {} of {} paths to regular files",
                entries.len(),
                paths.len()
            );
        }

        self.find_entries(entries)
    }

    /// Find duplicates among already-resolved entries.
    #[must_use]
    pub fn find_entries(&self, files: Vec<FileEntry>) -> (DuplicateMap, ScanSummary) {
        let start_time = Instant::now();

        let mut summary = ScanSummary {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            ..Default::default()
        };

        let pairs = digest_all(files, &self.hasher, &self.config);
        let (groups, stats) = group_by_hash(pairs);

        summary.unhashable_files = stats.unhashable_files;
        summary.duplicate_groups = stats.duplicate_groups;
        summary.duplicate_files = stats.duplicate_files;
        summary.wasted_space = stats.wasted_space;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Found {} duplicate groups ({} copies, {} reclaimable) in {:?}",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.wasted_display(),
            summary.scan_duration
        );

        (groups, summary)
    }

    /// Crawl `root` with the configured walker and find duplicates.
    ///
    /// # Errors
    ///
    /// - `PathNotFound` if `root` does not exist
    /// - `NotADirectory` if `root` is not a directory
    pub fn scan_directory(&self, root: &Path) -> Result<(DuplicateMap, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        log::info!("Scanning {}", root.display());

        let walker = Walker::new(root, self.config.walker_config.clone());
        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    files.push(file);
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len(), file_display(&files));
                    }
                }
                Err(e) => log::debug!("Skipping unreadable entry: {}", e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        log::info!("Found {} files under {}", files.len(), root.display());

        let (groups, mut summary) = self.find_entries(files);
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }
}

fn file_display(files: &[FileEntry]) -> &str {
    files
        .last()
        .and_then(|f| f.path.to_str())
        .unwrap_or_default()
}
