mod cli;
mod logging;
mod reporter;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use csv_merger::{AppConfig, MergeEngine, MergeStatus, MergeSummary, SilentReporter};
use dotenv::dotenv;
use reporter::CliReporter;
use std::process;
use tracing::{debug, error, info};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FATAL: i32 = 1;
const EXIT_WRITE_FAILED: i32 = 2;

fn main() {
    dotenv().ok();

    let args = Cli::parse();

    let code = {
        let _guard = logging::init_logger();
        run(&args)
    };

    process::exit(code);
}

fn run(args: &Cli) -> i32 {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            return EXIT_FATAL;
        }
    };
    debug!("config: {:?}", config);

    let engine = MergeEngine::new(config);
    let result = if args.quiet {
        engine.run(&SilentReporter)
    } else {
        engine.run(&CliReporter::new())
    };

    match result {
        Ok(summary) if summary.status == MergeStatus::NoInputFiles => {
            error!(
                "No CSV files found in the directory: {}",
                summary.input_dir.display()
            );
            info!("Please check the --input-dir argument.");
            EXIT_SUCCESS
        }
        Ok(summary) => {
            print_summary(&summary);
            EXIT_SUCCESS
        }
        Err(err) if err.is_write_failure() => {
            error!("{}", err);
            error!("Please check if the file is already open or if you have permissions.");
            EXIT_WRITE_FAILED
        }
        Err(err) => {
            error!("Error: {}", err);
            EXIT_FATAL
        }
    }
}

fn load_config(args: &Cli) -> anyhow::Result<AppConfig> {
    csv_merger::config::load_configuration(&args.overrides())
        .context("Error loading configuration")
}

fn print_summary(summary: &MergeSummary) {
    info!("Success! Merged {} files", summary.files_merged);
    info!(
        "Merged file saved to: {}",
        summary.output_path.display().to_string().green()
    );
    info!(
        "Final file contains {} unique rows ({} read, {} duplicates removed)",
        format!("{}", summary.rows_written).green(),
        summary.rows_read,
        format!("{}", summary.duplicates_removed()).red(),
    );
    debug!(
        "Load: {}, Dedup: {}, Write: {}",
        format!("{:.2}s", summary.load_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.dedup_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.write_duration.as_secs_f64()).green(),
    );
}
