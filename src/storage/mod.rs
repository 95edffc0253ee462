pub mod atomic_writer;

pub use atomic_writer::{write_table, AtomicCsvWriter};
