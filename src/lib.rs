//! StrataOptima - duplicate file finder and file organizer
//!
//! Finds files with byte-identical content using MD5, SHA-1 or SHA-256
//! digests computed on a bounded thread pool, and sorts files into category
//! folders by type with collision-safe renaming.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use actions::organize::{organize_batch, BatchOrganizeResult, OrganizeConfig};
use cli::{AnalyzeArgs, Cli, Commands, OrganizeArgs, OutputFormat, WalkArgs};
use config::Config;
use duplicates::{DuplicateFinder, FinderConfig};
use error::ExitCode;
use output::json::{AnalysisReport, OrganizeReport};
use output::text;
use progress::Progress;
use scanner::{FileType, Walker, WalkerConfig};

/// Run the application logic, writing reports to stdout.
///
/// # Errors
///
/// Returns an error if the target path is unusable or the report can't be
/// written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if !io::stdout().is_terminal() {
        yansi::disable();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = run_with_writer(cli, &mut out)?;
    out.flush().context("Failed to flush stdout")?;
    Ok(code)
}

/// Run the application logic, writing reports to `out`.
///
/// # Errors
///
/// Returns an error if the target path is unusable or the report can't be
/// written.
pub fn run_with_writer<W: Write>(cli: Cli, out: &mut W) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load();
    log::debug!("Effective config: {:?}", config);

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config, cli.quiet, out),
        Commands::Organize(args) => handle_organize(args, &config, cli.quiet, out),
    }
}

fn walker_config(walk: WalkArgs, file_types: Vec<FileType>, config: &Config) -> WalkerConfig {
    WalkerConfig::new(
        walk.follow_symlinks || config.follow_symlinks,
        walk.skip_hidden || config.skip_hidden,
        walk.ignore_patterns,
    )
    .with_file_types(file_types)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Absolute `path` with `.` and `..` collapsed, symlinks resolved through its
/// deepest existing ancestor. The path itself need not exist.
fn resolve(path: &Path) -> PathBuf {
    let lexical = absolute(path)
        .components()
        .fold(PathBuf::new(), |mut acc, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    acc.pop();
                }
                other => acc.push(other),
            }
            acc
        });

    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return lexical.clone(),
        }
    }
}

fn handle_analyze<W: Write>(
    args: AnalyzeArgs,
    config: &Config,
    quiet: bool,
    out: &mut W,
) -> Result<ExitCode> {
    let root = absolute(&args.path);

    let finder_config = FinderConfig::default()
        .with_algorithm(args.algorithm.unwrap_or(config.algorithm))
        .with_io_threads(args.io_threads.map_or(config.io_threads, usize::from))
        .with_batch_size(args.batch_size.map_or(config.batch_size, |n| n as usize))
        .with_buffer_size(config.buffer_size)
        .with_walker_config(walker_config(args.walk, args.file_types, config))
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    let finder = DuplicateFinder::new(finder_config);
    let algorithm = finder.config().algorithm;
    let (groups, summary) = finder
        .scan_directory(&root)
        .with_context(|| format!("Failed to analyze {}", args.path.display()))?;

    let exit_code = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    match args.output {
        OutputFormat::Text => text::write_analysis(out, &root, &groups, &summary, args.details)
            .context("Failed to write report")?,
        OutputFormat::Json => AnalysisReport::new(&root, algorithm, &groups, &summary, exit_code)
            .write_to(out)
            .context("Failed to write JSON report")?,
    }

    Ok(exit_code)
}

fn handle_organize<W: Write>(
    args: OrganizeArgs,
    config: &Config,
    quiet: bool,
    out: &mut W,
) -> Result<ExitCode> {
    let requested = absolute(&args.path);
    if !requested.exists() {
        bail!("Source directory not found: {}", args.path.display());
    }
    if !requested.is_dir() {
        bail!("Source is not a directory: {}", args.path.display());
    }
    let canonical = fs::canonicalize(&requested)
        .with_context(|| format!("Failed to resolve {}", args.path.display()))?;

    let target_root = resolve(&args.target);
    let dry_run = !args.execute;

    let walker = Walker::new(&canonical, walker_config(args.walk, args.file_types, config));
    let source = walker.root();
    let discovered = walker.collect_files();
    let discovered_count = discovered.len();

    // Files already under the target root stay where they are
    let files: Vec<PathBuf> = discovered
        .into_iter()
        .map(|f| f.path)
        .filter(|p| !p.starts_with(&target_root))
        .collect();

    if files.len() < discovered_count {
        log::info!(
            "Skipping {} file(s) already under {}",
            discovered_count - files.len(),
            target_root.display()
        );
    }

    let organize_config = OrganizeConfig::new(&target_root).with_dry_run(dry_run);

    if files.is_empty() {
        let result = BatchOrganizeResult::default();
        match args.output {
            OutputFormat::Text => writeln!(out, "No files to organize in {}", source.display())
                .context("Failed to write report")?,
            OutputFormat::Json => OrganizeReport::new(
                source,
                &target_root,
                dry_run,
                &result,
                ExitCode::NoDuplicates,
            )
            .write_to(out)
            .context("Failed to write JSON report")?,
        }
        return Ok(ExitCode::NoDuplicates);
    }

    if args.output == OutputFormat::Text {
        text::write_organize_header(out, source, &target_root, files.len(), dry_run)
            .context("Failed to write report")?;
    }

    let progress = Progress::new(quiet);
    let result = organize_batch(&files, &organize_config, Some(&progress));

    let exit_code = if result.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    };

    match args.output {
        OutputFormat::Text => {
            text::write_organize_lines(out, source, &target_root, &files, &result)
                .context("Failed to write report")?;
            text::write_organize_summary(out, &result, dry_run)
                .context("Failed to write report")?;
        }
        OutputFormat::Json => {
            OrganizeReport::new(source, &target_root, dry_run, &result, exit_code)
                .write_to(out)
                .context("Failed to write JSON report")?;
        }
    }

    Ok(exit_code)
}
