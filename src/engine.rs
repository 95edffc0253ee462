use crate::config::{AppConfig, DEFAULT_KEY_COLUMN};
use crate::error::Error;
use crate::progress::MergeReporter;
use crate::scanner;
use crate::storage;
use crate::table::{DedupOutcome, Table};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct MergeEngine {
    config: AppConfig,
    key_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    /// No input files were found; nothing was written.
    NoInputFiles,
    /// The merged table was written to `output_path`.
    Written,
}

#[derive(Debug)]
pub struct MergeSummary {
    pub status: MergeStatus,
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub files_merged: usize,
    pub rows_read: usize,
    pub dedup: DedupOutcome,
    pub rows_written: usize,
    pub load_duration: Duration,
    pub dedup_duration: Duration,
    pub write_duration: Duration,
}

impl MergeSummary {
    fn empty(config: &AppConfig) -> Self {
        Self {
            status: MergeStatus::NoInputFiles,
            input_dir: config.input_dir.clone(),
            output_path: config.output_path(),
            files_merged: 0,
            rows_read: 0,
            dedup: DedupOutcome::Removed(0),
            rows_written: 0,
            load_duration: Duration::ZERO,
            dedup_duration: Duration::ZERO,
            write_duration: Duration::ZERO,
        }
    }

    pub fn duplicates_removed(&self) -> usize {
        self.dedup.removed()
    }
}

impl MergeEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            key_column: DEFAULT_KEY_COLUMN.to_string(),
        }
    }

    pub fn with_key_column(mut self, key_column: &str) -> Self {
        self.key_column = key_column.to_string();
        self
    }

    /// Run the merge pipeline:
    /// 1. Find `*.csv` files in the input directory
    /// 2. Load every file, aborting on the first parse failure
    /// 3. Concatenate with column union
    /// 4. Drop rows whose key was already seen, then write the output
    pub fn run(&self, reporter: &dyn MergeReporter) -> Result<MergeSummary, Error> {
        let output_path = self.config.output_path();

        // Phase 1: Discover
        let files =
            scanner::discover_csv_files(&self.config.input_dir, Some(output_path.as_path()))?;
        reporter.on_discovery_complete(files.len());
        if files.is_empty() {
            return Ok(MergeSummary::empty(&self.config));
        }
        info!("Found {} CSV files. Starting merge...", files.len());

        // Phase 2: Load and concatenate
        reporter.on_load_start(files.len());
        let load_start = Instant::now();
        let mut tables = Vec::with_capacity(files.len());
        for path in &files {
            let table = Table::from_path(path)?;
            debug!("{}: {} rows", path.display(), table.len());
            reporter.on_file_loaded(path, table.len());
            tables.push(table);
        }
        let mut merged = Table::concat(tables);
        let load_duration = load_start.elapsed();
        let rows_read = merged.len();
        reporter.on_load_complete(rows_read, load_duration.as_secs_f64());
        info!("Total rows from all files: {}", rows_read);
        debug!(
            "Load completed in {:.2}s, {} columns",
            load_duration.as_secs_f64(),
            merged.columns().len()
        );

        // Phase 3: Dedup
        let dedup_start = Instant::now();
        let dedup = merged.dedup_by_column(&self.key_column);
        let dedup_duration = dedup_start.elapsed();
        match dedup {
            DedupOutcome::Removed(count) => {
                info!("Removed {} duplicate rows on '{}'", count, self.key_column)
            }
            DedupOutcome::MissingKeyColumn => warn!(
                "'{}' column not found. Cannot remove duplicates.",
                self.key_column
            ),
        }
        reporter.on_dedup_complete(dedup, merged.len());

        // Phase 4: Write
        reporter.on_write_start(&output_path);
        let write_start = Instant::now();
        let output_path = storage::write_table(&merged, &output_path)?;
        let write_duration = write_start.elapsed();
        reporter.on_write_complete(&output_path, merged.len(), write_duration.as_secs_f64());
        debug!(
            "Write completed in {:.2}s to {}",
            write_duration.as_secs_f64(),
            output_path.display()
        );

        Ok(MergeSummary {
            status: MergeStatus::Written,
            input_dir: self.config.input_dir.clone(),
            output_path,
            files_merged: files.len(),
            rows_read,
            dedup,
            rows_written: merged.len(),
            load_duration,
            dedup_duration,
            write_duration,
        })
    }
}
