use crate::error::Error;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CSV_PATTERN: &str = "*.csv";

/// Lists the `*.csv` files directly inside `input_dir`, sorted by path.
///
/// Subdirectories are not searched, hidden files and non-regular entries are
/// skipped. `exclude` (normally the merge output) is dropped from the result
/// when it points at one of the discovered files.
pub fn discover_csv_files(input_dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, Error> {
    if !input_dir.is_dir() {
        return Err(Error::InputDir(input_dir.to_path_buf()));
    }

    let Some(dir_text) = input_dir.to_str() else {
        return Err(Error::InputDir(input_dir.to_path_buf()));
    };
    let escaped_dir = Pattern::escape(dir_text);
    let search_pattern = Path::new(&escaped_dir).join(CSV_PATTERN);
    debug!("Search pattern: {}", search_pattern.display());

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());

    let mut files = Vec::new();
    for entry in glob::glob_with(&search_pattern.to_string_lossy(), options)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                let path = err.path().to_path_buf();
                return Err(Error::Discovery {
                    path,
                    source: err.into_error(),
                });
            }
        };

        if !path.is_file() {
            debug!("Skipping non-file entry {}", path.display());
            continue;
        }

        if let Some(excluded) = &excluded {
            if fs::canonicalize(&path).ok().as_ref() == Some(excluded) {
                info!("Skipping previous output {}", path.display());
                continue;
            }
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, "Link\n").unwrap();
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_discover_only_top_level_csv() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("b.csv"));
        touch(&tmp.path().join("a.csv"));
        touch(&tmp.path().join("notes.txt"));
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested").join("c.csv"));

        let files = discover_csv_files(tmp.path(), None).unwrap();
        assert_eq!(names(&files), vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_discover_skips_directories_and_hidden_files() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("folder.csv")).unwrap();
        touch(&tmp.path().join(".hidden.csv"));
        touch(&tmp.path().join("jobs.csv"));

        let files = discover_csv_files(tmp.path(), None).unwrap();
        assert_eq!(names(&files), vec!["jobs.csv"]);
    }

    #[test]
    fn test_discover_excludes_output_file() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a.csv"));
        touch(&tmp.path().join("MERGED_jobs.csv"));

        let output = tmp.path().join(".").join("MERGED_jobs.csv");
        let files = discover_csv_files(tmp.path(), Some(&output)).unwrap();
        assert_eq!(names(&files), vec!["a.csv"]);
    }

    #[test]
    fn test_discover_empty_directory() {
        let tmp = tempdir().unwrap();
        let files = discover_csv_files(tmp.path(), None).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_escapes_glob_characters_in_dir() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("jobs [2024]");
        fs::create_dir(&dir).unwrap();
        touch(&dir.join("a.csv"));

        let files = discover_csv_files(&dir, None).unwrap();
        assert_eq!(names(&files), vec!["a.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_rejects_non_utf8_directory() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let dir = tmp.path().join(OsStr::from_bytes(b"jobs_\xff"));
        fs::create_dir(&dir).unwrap();
        touch(&dir.join("a.csv"));

        let result = discover_csv_files(&dir, None);
        assert!(matches!(result, Err(Error::InputDir(_))));
    }

    #[test]
    fn test_discover_missing_directory() {
        let tmp = tempdir().unwrap();
        let result = discover_csv_files(&tmp.path().join("missing"), None);
        assert!(matches!(result, Err(Error::InputDir(_))));
    }
}
