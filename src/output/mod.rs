//! Output formatters for analyze and organize runs.
//!
//! - [`text`] for terminals
//! - [`json`] for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use strataoptima::duplicates::DuplicateFinder;
//! use strataoptima::output::text::write_analysis;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let (groups, summary) = DuplicateFinder::with_defaults().scan_directory(root).unwrap();
//!
//! let mut stdout = std::io::stdout();
//! write_analysis(&mut stdout, root, &groups, &summary, true).unwrap();
//! ```

pub mod json;
pub mod text;

use std::path::Path;

use crate::duplicates::{DuplicateGroup, DuplicateMap};

// Re-export main types
pub use json::{AnalysisReport, JsonOutputError, OrganizeReport};

/// Groups in report order: most wasted bytes first, ties broken by digest.
#[must_use]
pub fn sorted_groups(groups: &DuplicateMap) -> Vec<&DuplicateGroup> {
    let mut sorted: Vec<&DuplicateGroup> = groups.values().collect();
    sorted.sort_by(|a, b| {
        b.total_size()
            .cmp(&a.total_size())
            .then_with(|| a.hash.cmp(&b.hash))
    });
    sorted
}

/// Display `path` relative to `root` when it lies under it.
#[must_use]
pub fn display_path(path: &Path, root: &Path) -> String {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    path.strip_prefix(&root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
