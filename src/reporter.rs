use csv_merger::{DedupOutcome, MergeReporter};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Load phase: progress bar (file count known from discovery)
/// - Write phase: spinner
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Some(old) = self.bar.borrow_mut().replace(pb) {
            old.finish_and_clear();
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl MergeReporter for CliReporter {
    fn on_load_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} Loading [{bar:30.cyan/dim}] {pos}/{len} files {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_loaded(&self, path: &Path, _rows: usize) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(name);
            pb.inc(1);
        }
    }

    fn on_load_complete(&self, total_rows: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Load complete: {} rows in {:.2}s",
            total_rows, duration_secs
        );
    }

    fn on_dedup_complete(&self, outcome: DedupOutcome, remaining_rows: usize) {
        match outcome {
            DedupOutcome::Removed(removed) => eprintln!(
                "  \x1b[32m✓\x1b[0m Dedup complete: {} removed, {} unique rows",
                removed, remaining_rows
            ),
            DedupOutcome::MissingKeyColumn => {
                eprintln!("  \x1b[33m!\x1b[0m Dedup skipped: key column missing")
            }
        }
    }

    fn on_write_start(&self, path: &Path) {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.set_message(format!("Writing {}...", path.display()));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_write_complete(&self, _path: &Path, rows: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Write complete: {} rows in {:.2}s",
            rows, duration_secs
        );
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        self.finish_bar();
    }
}
