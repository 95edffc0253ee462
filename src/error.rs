use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Input directory {} is not a readable directory", .0.display())]
    InputDir(PathBuf),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Error reading directory entry {}: {}", .path.display(), .source)]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {}", .path.display(), .reason)]
    Parse { path: PathBuf, reason: String },

    #[error("Could not save {}: {}", .path.display(), .reason)]
    Write { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Write failures are reported but are not treated as a crash of the run.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Error::Write { .. })
    }
}
