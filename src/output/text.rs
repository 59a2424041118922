//! Plain-text reports for terminals.
//!
//! Colors come from `yansi` and follow its global switch, which the binary
//! turns off for `--no-color`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use yansi::Paint;

use super::{display_path, sorted_groups};
use crate::actions::organize::{BatchOrganizeResult, OrganizeResult};
use crate::duplicates::{DuplicateMap, ScanSummary};
use crate::scanner::FileType;

/// Write the analysis report for `root`.
///
/// With `show_details` every group is listed, most wasted bytes first, with
/// the original and each copy on its own line.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_analysis<W: Write>(
    w: &mut W,
    root: &Path,
    groups: &DuplicateMap,
    summary: &ScanSummary,
    show_details: bool,
) -> io::Result<()> {
    writeln!(w, "{} {}", "Duplicate analysis:".bold(), root.display())?;
    writeln!(
        w,
        "  Files scanned:    {} ({})",
        summary.total_files,
        summary.total_size_display()
    )?;
    if summary.unhashable_files > 0 {
        writeln!(
            w,
            "  Unreadable files: {}",
            summary.unhashable_files.yellow()
        )?;
    }
    writeln!(w, "  Duplicate groups: {}", summary.duplicate_groups.red())?;
    writeln!(w, "  Duplicate files:  {}", summary.duplicate_files.red())?;
    writeln!(
        w,
        "  Wasted space:     {} ({:.1}%)",
        summary.wasted_display().red(),
        summary.wasted_percentage()
    )?;
    writeln!(
        w,
        "  Scan time:        {}",
        format!("{:.2}s", summary.scan_duration.as_secs_f64()).green()
    )?;

    if groups.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", "No duplicate files found.".green())?;
        return Ok(());
    }

    if !show_details {
        writeln!(w)?;
        writeln!(w, "Run with --details to list every group.")?;
        return Ok(());
    }

    for group in sorted_groups(groups) {
        writeln!(w)?;
        writeln!(
            w,
            "{} {} files, {} wasted",
            format!("[{}]", group.short_hash()).cyan(),
            group.total_count(),
            ByteSize::b(group.total_size())
        )?;
        writeln!(
            w,
            "  {} {}",
            "Original:".green(),
            display_path(&group.original.path, root)
        )?;
        for copy in &group.copies {
            writeln!(w, "  {}     {}", "Copy:".yellow(), display_path(&copy.path, root))?;
        }
    }

    Ok(())
}

/// Write the banner printed before an organize run.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_organize_header<W: Write>(
    w: &mut W,
    source: &Path,
    target_root: &Path,
    file_count: usize,
    dry_run: bool,
) -> io::Result<()> {
    let mode = if dry_run {
        "DRY RUN".yellow().bold().to_string()
    } else {
        "EXECUTE".red().bold().to_string()
    };
    writeln!(
        w,
        "{} {} file(s) from {} into {} [{}]",
        "Organizing".bold(),
        file_count,
        source.display(),
        target_root.display(),
        mode
    )?;
    writeln!(w)
}

/// Write one line for a planned or completed move.
///
/// `[->]` marks a planned move, `[OK]` a completed one. The source is shown
/// relative to `source_root`, the target relative to `target_root`.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_organize_line<W: Write>(
    w: &mut W,
    source_root: &Path,
    target_root: &Path,
    result: &OrganizeResult,
) -> io::Result<()> {
    let marker = if result.is_dry_run() {
        "[->]".cyan().to_string()
    } else {
        "[OK]".green().to_string()
    };
    writeln!(
        w,
        "{} {} -> {}",
        marker,
        display_path(&result.source.path, source_root),
        display_path(&result.target_path, target_root)
    )
}

/// Write one line for a file that could not be organized.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_organize_failure<W: Write>(
    w: &mut W,
    source_root: &Path,
    path: &Path,
    error: &str,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {}",
        "[FAIL]".red(),
        display_path(path, source_root),
        error
    )
}

/// Write one line per file of `files`, in that order.
///
/// `result` must come from organizing `files`.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_organize_lines<W: Write>(
    w: &mut W,
    source_root: &Path,
    target_root: &Path,
    files: &[PathBuf],
    result: &BatchOrganizeResult,
) -> io::Result<()> {
    let mut successes = result.successes.iter();
    let mut failures = result.failures.iter().peekable();

    for path in files {
        match failures.peek() {
            Some((failed, error)) if failed == path => {
                write_organize_failure(w, source_root, failed, error)?;
                failures.next();
            }
            _ => {
                if let Some(outcome) = successes.next() {
                    write_organize_line(w, source_root, target_root, outcome)?;
                }
            }
        }
    }

    Ok(())
}

/// Write the per-category counts and the closing summary line.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_organize_summary<W: Write>(
    w: &mut W,
    result: &BatchOrganizeResult,
    dry_run: bool,
) -> io::Result<()> {
    writeln!(w)?;

    for file_type in FileType::ALL {
        let count = result
            .successes
            .iter()
            .filter(|r| r.file_type() == file_type)
            .count();
        if count > 0 {
            writeln!(w, "  {:<13} {}", format!("{}:", file_type.folder_name()), count)?;
        }
    }

    let summary = result.summary();
    if result.all_succeeded() {
        writeln!(w, "{}", summary.green())?;
    } else {
        writeln!(w, "{}", summary.yellow())?;
    }

    if dry_run && result.success_count() > 0 {
        writeln!(w, "Nothing was moved. Re-run with --execute to apply.")?;
    }

    Ok(())
}
