//! Recursive crawl over a directory tree, built on jwalk.
//!
//! [`Walker`] reports regular files only, visiting children in name order
//! so repeated runs list files identically. [`crawl`] is the
//! no-configuration shortcut. Ignore lines, hidden-name skipping, symlink
//! following and category restriction come from [`WalkerConfig`].
//!
//! A root that does not exist or is not a directory yields nothing. That is
//! not an error; the caller decides whether an empty result is a failure.
//!
//! # Example
//!
//! ```no_run
//! use strataoptima::scanner::crawl;
//! use std::path::Path;
//!
//! let files = crawl(Path::new("/home/user/Downloads"));
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Collect every regular file under `root` with the default configuration.
///
/// Errors on individual entries are logged and skipped. Returns an empty
/// vector if `root` is missing or not a directory.
#[must_use]
pub fn crawl(root: &Path) -> Vec<FileEntry> {
    Walker::new(root, WalkerConfig::default()).collect_files()
}

/// Crawler rooted at one directory.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Walker for `path`, made absolute against the working directory.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self { root, config }
    }

    /// The absolute root this walker descends from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the ignore matcher from config patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path, or any directory above it, matches an ignore pattern.
    fn should_ignore(&self, path: &Path, gitignore: &Option<Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        gi.matched_path_or_any_parents(relative_path, false)
            .is_ignore()
    }

    /// Check if a file passes the file type filter.
    fn passes_file_type_filter(&self, path: &Path) -> bool {
        if self.config.file_types.is_empty() {
            return true;
        }
        self.config
            .file_types
            .contains(&super::FileType::from_path(path))
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Yields nothing if the root is missing or not a directory.
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<FileEntry, ScanError>> + '_> {
        if !self.root.is_dir() {
            log::debug!(
                "Walker: root {} is missing or not a directory",
                self.root.display()
            );
            return Box::new(std::iter::empty());
        }

        let gitignore = self.build_gitignore();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        Box::new(walk_dir.into_iter().filter_map(move |entry_result| {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    if self.should_ignore(&path, &gitignore) {
                        log::trace!("Ignoring file: {}", path.display());
                        return None;
                    }

                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = if self.config.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    let metadata = match metadata {
                        Ok(m) => m,
                        Err(e) => return Some(Err(handle_io_error(&path, e))),
                    };

                    // Sockets, fifos, device nodes and dangling links
                    if !metadata.is_file() {
                        log::trace!("Skipping non-regular file: {}", path.display());
                        return None;
                    }

                    if !self.passes_file_type_filter(&path) {
                        log::trace!("Skipping file due to file type filter: {}", path.display());
                        return None;
                    }

                    Some(Ok(FileEntry::with_metadata(path, &metadata)))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }))
                }
            }
        }))
    }

    /// Walk the tree and collect the files, logging and dropping errors.
    #[must_use]
    pub fn collect_files(&self) -> Vec<FileEntry> {
        let files: Vec<FileEntry> = self
            .walk()
            .filter_map(|result| match result {
                Ok(file) => Some(file),
                Err(e) => {
                    log::debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .collect();

        log::debug!(
            "Walker: found {} files under {}",
            files.len(),
            self.root.display()
        );
        files
    }
}

/// Classify a metadata failure, logging it at a level matching its kind.
fn handle_io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => {
            log::warn!("No permission to read {}", path.display());
            ScanError::PermissionDenied(path.to_path_buf())
        }
        ErrorKind::NotFound => {
            log::debug!("Vanished during walk: {}", path.display());
            ScanError::NotFound(path.to_path_buf())
        }
        _ => {
            log::warn!("I/O error for {}: {}", path.display(), error);
            ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}
