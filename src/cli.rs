//! Command-line interface definitions.
//!
//! Global options (verbosity, color, error format) apply to every
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate files under ~/Downloads, listing every group
//! strataoptima analyze -p ~/Downloads --details
//!
//! # Use SHA-256 and emit JSON
//! strataoptima analyze -p ~/Downloads -a sha256 -o json
//!
//! # Preview how ~/Downloads would be organized, then do it
//! strataoptima organize -p ~/Downloads -t ~/Sorted
//! strataoptima organize -p ~/Downloads -t ~/Sorted --execute
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::actions::DEFAULT_TARGET_ROOT;
use crate::scanner::{FileType, HashAlgorithm};

/// Duplicate file finder and type-based file organizer.
#[derive(Debug, Parser)]
#[command(name = "strataoptima")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find files with identical content
    Analyze(AnalyzeArgs),
    /// Move files into category folders by type
    Organize(OrganizeArgs),
}

/// Arguments for the analyze subcommand.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Directory to scan for duplicates
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// List every duplicate group with its original and copies
    #[arg(short, long)]
    pub details: bool,

    /// Digest algorithm (default: md5)
    #[arg(short, long, value_enum, value_name = "ALGORITHM")]
    pub algorithm: Option<HashAlgorithm>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Files submitted to the hashing pool per batch (default: 64)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub batch_size: Option<u32>,

    /// Restrict the scan to these file types (can be specified multiple times)
    #[arg(short = 'T', long = "type", value_enum, value_name = "TYPE")]
    pub file_types: Vec<FileType>,

    #[command(flatten)]
    pub walk: WalkArgs,
}

/// Arguments for the organize subcommand.
#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Directory whose files are organized
    #[arg(short, long, value_name = "PATH")]
    pub path: PathBuf,

    /// Root the category folders are created under
    #[arg(short, long, value_name = "TARGET", default_value = DEFAULT_TARGET_ROOT)]
    pub target: PathBuf,

    /// Actually move files. Without this flag nothing is touched.
    #[arg(short, long)]
    pub execute: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Only organize these file types (can be specified multiple times)
    #[arg(short = 'T', long = "type", value_enum, value_name = "TYPE")]
    pub file_types: Vec<FileType>,

    #[command(flatten)]
    pub walk: WalkArgs,
}

/// Traversal options shared by both subcommands.
#[derive(Debug, Args)]
pub struct WalkArgs {
    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links during the walk
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
