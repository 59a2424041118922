//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Parallel content digesting in bounded batches
//! - Grouping by digest with an oldest-first original
//! - Directory scans combining both

pub mod finder;
pub mod groups;

pub use finder::{
    digest_all, DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_BATCH_SIZE,
    DEFAULT_IO_THREADS,
};
pub use groups::{group_by_hash, DuplicateGroup, DuplicateMap, GroupingStats};
