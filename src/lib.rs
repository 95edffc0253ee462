pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod scanner;
pub mod storage;
pub mod table;

pub use crate::config::AppConfig;
pub use crate::engine::{MergeEngine, MergeStatus, MergeSummary};
pub use crate::error::Error;
pub use crate::progress::{MergeReporter, SilentReporter};
pub use crate::table::{DedupOutcome, Table};
