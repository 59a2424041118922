//! Duplicate grouping by content digest.
//!
//! # Overview
//!
//! The grouper partitions `(file, digest)` pairs by digest, discards digests
//! seen only once, and orders each surviving group by modification time so
//! that the oldest file becomes the original and the rest become copies.
//!
//! The sort is stable: files with equal timestamps keep their input order,
//! so the outcome does not depend on which hash finished first as long as
//! the pairs arrive in input order.
//!
//! Pairs with an empty digest (files that could not be read) are dropped
//! before grouping. Two unreadable files therefore never show up as a
//! duplicate group.
//!
//! # Example
//!
//! ```
//! use strataoptima::scanner::FileEntry;
//! use strataoptima::duplicates::group_by_hash;
//! use std::path::PathBuf;
//! use std::time::{Duration, SystemTime};
//!
//! let old = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
//! let new = SystemTime::UNIX_EPOCH + Duration::from_secs(200);
//!
//! let pairs = vec![
//!     (FileEntry::new(PathBuf::from("/new.txt"), 4, new), "aa".to_string()),
//!     (FileEntry::new(PathBuf::from("/old.txt"), 4, old), "aa".to_string()),
//!     (FileEntry::new(PathBuf::from("/other.txt"), 9, old), "bb".to_string()),
//! ];
//!
//! let (groups, stats) = group_by_hash(pairs);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups["aa"].original.name(), "old.txt");
//! assert_eq!(stats.duplicate_files, 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileEntry;

/// Mapping from content digest to its duplicate group.
///
/// Only digests with two or more files appear. Iteration order carries no
/// meaning.
pub type DuplicateMap = HashMap<String, DuplicateGroup>;

/// Files sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Lower-case hex digest shared by every member
    pub hash: String,
    /// Earliest-modified member
    pub original: FileEntry,
    /// Remaining members, oldest first. Never empty.
    pub copies: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Build a group from members sharing `hash`.
    ///
    /// Members are stably sorted by modification time; the first becomes the
    /// original. Returns `None` for fewer than two members.
    #[must_use]
    pub fn from_members(hash: String, mut members: Vec<FileEntry>) -> Option<Self> {
        if members.len() < 2 {
            return None;
        }

        members.sort_by_key(|f| f.modified);
        let mut members = members.into_iter();
        let original = members.next()?;

        Some(Self {
            hash,
            original,
            copies: members.collect(),
        })
    }

    /// Number of files in the group, original included.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.copies.len() + 1
    }

    /// Bytes taken by the copies. The original is not counted as wasted.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.copies.iter().map(|f| f.size).sum()
    }

    /// Number of copies.
    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.copies.len()
    }

    /// Original followed by copies.
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        std::iter::once(&self.original).chain(self.copies.iter())
    }

    /// Paths of every member, original first.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().map(|f| f.path.clone()).collect()
    }

    /// First eight characters of the digest, for display.
    #[must_use]
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(8);
        &self.hash[..end]
    }
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of pairs received
    pub total_files: usize,
    /// Pairs dropped because their digest was empty
    pub unhashable_files: usize,
    /// Number of distinct non-empty digests
    pub unique_hashes: usize,
    /// Number of groups with 2+ files
    pub duplicate_groups: usize,
    /// Number of copies across all groups (originals excluded)
    pub duplicate_files: usize,
    /// Bytes taken by copies across all groups
    pub wasted_space: u64,
}

/// Group `(file, digest)` pairs into duplicate groups.
///
/// # Arguments
///
/// * `pairs` - Files with their digests, in input order
///
/// # Returns
///
/// A tuple of:
/// - `DuplicateMap` - Groups keyed by digest (only digests with 2+ files)
/// - `GroupingStats` - Statistics about the grouping
#[must_use]
pub fn group_by_hash(
    pairs: impl IntoIterator<Item = (FileEntry, String)>,
) -> (DuplicateMap, GroupingStats) {
    let mut stats = GroupingStats::default();
    let mut by_hash: HashMap<String, Vec<FileEntry>> = HashMap::new();

    for (file, hash) in pairs {
        stats.total_files += 1;

        if hash.is_empty() {
            stats.unhashable_files += 1;
            log::debug!("Excluding unhashable file: {}", file.path.display());
            continue;
        }

        by_hash.entry(hash).or_default().push(file);
    }

    if stats.unhashable_files > 0 {
        log::warn!(
            "Excluded {} unreadable file(s) from duplicate detection",
            stats.unhashable_files
        );
    }

    stats.unique_hashes = by_hash.len();

    let groups: DuplicateMap = by_hash
        .into_iter()
        .filter_map(|(hash, files)| {
            let group = DuplicateGroup::from_members(hash.clone(), files)?;
            log::debug!(
                "Duplicate group {}: original {}, {} copies",
                group.short_hash(),
                group.original.path.display(),
                group.copy_count()
            );
            Some((hash, group))
        })
        .collect();

    stats.duplicate_groups = groups.len();
    stats.duplicate_files = groups.values().map(DuplicateGroup::copy_count).sum();
    stats.wasted_space = groups.values().map(DuplicateGroup::total_size).sum();

    log::info!(
        "Grouping complete: {} files → {} groups, {} copies, {} bytes reclaimable",
        stats.total_files,
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space
    );

    (groups, stats)
}
