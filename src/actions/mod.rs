//! File actions module.
//!
//! Currently this is file organization: moving files into category folders
//! by type, with collision-safe renaming and a dry-run mode.
//!
//! ```no_run
//! use strataoptima::actions::{organize_batch, OrganizeConfig, OrganizeProgressCallback};
//! use std::path::PathBuf;
//!
//! let files = vec![PathBuf::from("Downloads/song.mp3")];
//! let config = OrganizeConfig::new("organized");
//!
//! let result = organize_batch::<dyn OrganizeProgressCallback>(&files, &config, None);
//! println!("{}", result.summary());
//! ```

pub mod organize;

// Re-export commonly used types
pub use organize::{
    organize, organize_batch, resolve_collision, BatchOrganizeResult, OrganizeConfig,
    OrganizeError, OrganizeMode, OrganizeProgressCallback, OrganizeResult, DEFAULT_TARGET_ROOT,
};
