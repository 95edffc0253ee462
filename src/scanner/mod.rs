mod walk;

pub use walk::{discover_csv_files, CSV_PATTERN};
