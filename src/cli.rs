use clap::Parser;
use csv_merger::config::ConfigOverrides;
use std::path::PathBuf;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "csv-merger")]
#[command(about = "Merge the CSV files of a directory, dropping repeated links", long_about = None)]
pub struct Cli {
    /// Directory scanned for *.csv files [default: .]
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Merged file, relative to the input directory [default: ./MERGED_jobs.csv]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input_dir.clone(),
            output: self.output.clone(),
        }
    }
}
