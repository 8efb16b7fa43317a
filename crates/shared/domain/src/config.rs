use crate::constants::DATA_FILE_NAME;
use crate::grading::GradingPolicy;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level application configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub grading: GradingPolicy,
    pub logging: LoggingConfig,
}

/// Where the records file lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    /// Module directives such as `scholar_records=debug`.
    pub filter: Option<String>,
    pub console: bool,
    /// Enables rolling log files when set.
    pub directory: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("."), file_name: DATA_FILE_NAME.to_owned() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, console: true, directory: None, json: false }
    }
}
