use crate::table::DedupOutcome;
use std::path::Path;

/// Trait for reporting merge progress.
///
/// The CLI implements it with indicatif bars. All methods have default no-op
/// implementations.
pub trait MergeReporter {
    fn on_discovery_complete(&self, _files_found: usize) {}
    fn on_load_start(&self, _total_files: usize) {}
    fn on_file_loaded(&self, _path: &Path, _rows: usize) {}
    fn on_load_complete(&self, _total_rows: usize, _duration_secs: f64) {}
    fn on_dedup_complete(&self, _outcome: DedupOutcome, _remaining_rows: usize) {}
    fn on_write_start(&self, _path: &Path) {}
    fn on_write_complete(&self, _path: &Path, _rows: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl MergeReporter for SilentReporter {}
