use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = ".";
pub const DEFAULT_OUTPUT: &str = "./MERGED_jobs.csv";
pub const DEFAULT_KEY_COLUMN: &str = "Link";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input_dir: PathBuf,
    pub output: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl AppConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: output.into(),
        }
    }

    /// The output is resolved against the input directory; an absolute
    /// output path is used as is.
    pub fn output_path(&self) -> PathBuf {
        self.input_dir.join(&self.output)
    }
}

/// Values given on the command line. `None` leaves lower layers in effect.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Layers: built-in defaults, `csv-merger.toml` in the working directory,
/// `CSV_MERGER_*` environment variables, then command line overrides.
pub fn load_configuration(overrides: &ConfigOverrides) -> Result<AppConfig, ConfigError> {
    load_from(Path::new("csv-merger"), overrides)
}

pub(crate) fn load_from(
    file_stem: &Path,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("input_dir", DEFAULT_INPUT_DIR)?
        .set_default("output", DEFAULT_OUTPUT)?
        .add_source(ConfigFile::with_name(&file_stem.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("CSV_MERGER"))
        .set_override_option("input_dir", path_value(&overrides.input_dir))?
        .set_override_option("output", path_value(&overrides.output))?
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}
