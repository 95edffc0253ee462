//! Atomic CSV output.
//!
//! Rows go to a temporary file next to the destination, which replaces the
//! destination only on `finish()`. Dropping the writer early removes the
//! temporary file, so a failed run never leaves a half-written output.

use crate::error::Error;
use crate::table::Table;
use csv::{Terminator, Writer, WriterBuilder};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

pub struct AtomicCsvWriter {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
    permissions: Option<fs::Permissions>,
}

impl AtomicCsvWriter {
    /// Creates the temporary file in the destination directory.
    ///
    /// Fails when the directory is missing or not writable, or when the
    /// destination exists and is read-only. The finished file keeps the mode
    /// of the file it replaces, or gets the umask default for a new file.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self, Error> {
        let final_path = final_path.as_ref().to_path_buf();

        let mut permissions = None;
        if let Ok(metadata) = fs::metadata(&final_path) {
            if metadata.is_dir() {
                return Err(Error::write(&final_path, "destination is a directory"));
            }
            if metadata.permissions().readonly() {
                return Err(Error::write(&final_path, "permission denied (file is read-only)"));
            }
            permissions = Some(metadata.permissions());
        }

        let parent_dir = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = Builder::new();
        // 0666 before umask, like File::create
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }

        let temp_file = builder.tempfile_in(parent_dir).map_err(|e| {
            Error::write(&final_path, format!("failed to create temporary file: {}", e))
        })?;
        debug!("Writing to temporary file {}", temp_file.path().display());

        let writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(temp_file));

        Ok(Self {
            writer,
            final_path,
            permissions,
        })
    }

    pub fn writer_mut(&mut self) -> &mut Writer<BufWriter<NamedTempFile>> {
        &mut self.writer
    }

    /// Flushes everything and moves the temporary file over the destination.
    pub fn finish(self) -> Result<PathBuf, Error> {
        let final_path = self.final_path;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| Error::write(&final_path, format!("failed to flush: {}", e.error())))?;

        let named_temp = buf_writer
            .into_inner()
            .map_err(|e| Error::write(&final_path, format!("failed to flush: {}", e.error())))?;

        if let Some(permissions) = self.permissions {
            fs::set_permissions(named_temp.path(), permissions)
                .map_err(|e| Error::write(&final_path, e))?;
        }

        named_temp
            .persist(&final_path)
            .map_err(|e| Error::write(&final_path, e.error))?;

        Ok(final_path)
    }
}

/// Writes `table` to `path` atomically and returns the path written.
pub fn write_table(table: &Table, path: &Path) -> Result<PathBuf, Error> {
    let mut writer = AtomicCsvWriter::new(path)?;
    table
        .write_records(writer.writer_mut())
        .map_err(|e| Error::write(path, e))?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_table() -> Table {
        Table::new(
            vec!["Link".to_string(), "Title".to_string()],
            vec![
                vec!["x".to_string(), "A".to_string()],
                vec!["y".to_string(), "Dev, Senior".to_string()],
                vec!["z".to_string(), String::new()],
            ],
        )
    }

    fn dir_entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_write_table_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        let written = write_table(&sample_table(), &path).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Link,Title\nx,A\ny,\"Dev, Senior\"\nz,\n");
        assert_eq!(dir_entries(temp_dir.path()), 1);
    }

    #[test]
    fn test_overwrites_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        fs::write(&path, "OLD_CONTENT").unwrap();

        write_table(&sample_table(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("OLD_CONTENT"));
        assert!(content.starts_with("Link,Title\n"));
    }

    #[test]
    fn test_missing_parent_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.csv");

        let err = write_table(&sample_table(), &path).unwrap_err();
        assert!(err.is_write_failure());
        assert!(!path.exists());
    }

    #[test]
    fn test_read_only_destination_is_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        fs::write(&path, "locked").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        let err = write_table(&sample_table(), &path).unwrap_err();
        assert!(err.is_write_failure());
        assert_eq!(fs::read_to_string(&path).unwrap(), "locked");
        assert_eq!(dir_entries(temp_dir.path()), 1);
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_has_regular_file_mode() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let plain = temp_dir.path().join("plain.txt");

        write_table(&sample_table(), &path).unwrap();
        fs::write(&plain, "plain").unwrap();

        assert_eq!(mode(&path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_table(&sample_table(), &path).unwrap();

        assert_eq!(mode(&path), 0o640);
    }

    #[test]
    fn test_drop_without_finish_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        {
            let mut writer = AtomicCsvWriter::new(&path).unwrap();
            writer.writer_mut().write_record(["Link"]).unwrap();
        }

        assert_eq!(dir_entries(temp_dir.path()), 0);
        assert!(!path.exists());
    }
}
