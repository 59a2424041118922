//! Terminal progress bars on indicatif.
//!
//! [`Progress`] implements [`ProgressCallback`] for the scan phases and
//! [`OrganizeProgressCallback`] for organize runs, drawing bars on stderr.
//! A quiet reporter draws nothing.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::actions::organize::{BatchOrganizeResult, OrganizeProgressCallback, OrganizeResult};

/// Progress callback for the duplicate detection phases.
///
/// Phases are `"walking"` (total unknown, reported as 0) and `"hashing"`.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// One more item handled in the current phase.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// indicatif-backed reporter.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    organizing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Examples
    ///
    /// ```
    /// use strataoptima::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// assert!(progress.is_quiet());
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            organizing: Mutex::new(None),
            quiet,
        }
    }

    /// True if nothing will be drawn.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn start_bar(&self, slot: &Mutex<Option<ProgressBar>>, total: usize, message: &'static str) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::bar_style());
        pb.set_message(message);
        if let Ok(mut slot) = slot.lock() {
            *slot = Some(pb);
        }
    }

    fn finish_bar(slot: &Mutex<Option<ProgressBar>>, message: &'static str) {
        if let Some(pb) = slot.lock().ok().and_then(|mut s| s.take()) {
            pb.finish_with_message(message);
        }
    }

    fn with_bar(slot: &Mutex<Option<ProgressBar>>, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = slot.lock() {
            if let Some(ref pb) = *slot {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "walking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_message("Walking directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                if let Ok(mut walking) = self.walking.lock() {
                    *walking = Some(pb);
                }
            }
            "hashing" => self.start_bar(&self.hashing, total, "Hashing"),
            other => log::debug!("No progress bar for phase '{}'", other),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let message = truncate_path(path, 30);
        let update = |pb: &ProgressBar| {
            pb.set_position(current as u64);
            pb.set_message(message.clone());
        };

        // Hashing runs after walking, so whichever bar is live is the current one
        if self.hashing.lock().is_ok_and(|s| s.is_some()) {
            Self::with_bar(&self.hashing, update);
        } else {
            Self::with_bar(&self.walking, update);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            "walking" => Self::finish_bar(&self.walking, "Walking complete"),
            "hashing" => Self::finish_bar(&self.hashing, "Hashing complete"),
            _ => {}
        }
    }
}

impl OrganizeProgressCallback for Progress {
    fn on_before_organize(&self, path: &Path, index: usize, total: usize) {
        if self.quiet {
            return;
        }

        if index == 0 {
            self.start_bar(&self.organizing, total, "Organizing");
        }
        let message = truncate_path(&path.to_string_lossy(), 30);
        Self::with_bar(&self.organizing, |pb| pb.set_message(message));
    }

    fn on_organize_success(&self, _result: &OrganizeResult) {
        Self::with_bar(&self.organizing, |pb| pb.inc(1));
    }

    fn on_organize_failure(&self, _path: &Path, _error: &str) {
        Self::with_bar(&self.organizing, |pb| pb.inc(1));
    }

    fn on_complete(&self, _result: &BatchOrganizeResult) {
        Self::finish_bar(&self.organizing, "Organizing complete");
    }
}

/// Shorten a path to at most `max_len` characters, keeping the file name.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
