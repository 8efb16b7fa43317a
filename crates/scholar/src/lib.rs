//! Facade crate for Scholar.
//! Re-exports the domain, kernel, storage and records crates and wires them from an
//! [`AppConfig`]. Keep this crate thin: it composes other crates, it does not implement
//! business logic.

pub use scholar_domain as domain;
pub use scholar_kernel as kernel;
pub use scholar_logger as logger;
pub use scholar_records as records;
pub use scholar_storage as storage;

use scholar_domain::config::{AppConfig, LoggingConfig};
use scholar_logger::{Logger, LoggerError};
use scholar_records::{LoadReport, Records, RecordsError};
use scholar_storage::Storage;
use tracing::warn;

/// Connects storage at `config.storage.data_dir` (creating it if needed) and opens the
/// records file there: load, then an initial save.
///
/// # Errors
/// [`RecordsError::Storage`] when the data directory cannot be used, and encoding failures
/// of the initial save.
pub async fn open(config: &AppConfig) -> Result<(Records, LoadReport), RecordsError> {
    let storage = Storage::builder().root(&config.storage.data_dir).connect().await?;

    let (records, report) = Records::new(storage)
        .with_file_name(&config.storage.file_name)
        .with_policy(config.grading)
        .open()
        .await?;

    for warning in &report.warnings {
        warn!(%warning, "Records opened with a warning");
    }
    Ok((records, report))
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
/// See [`scholar_logger::LoggerBuilder::init`].
pub fn init_logging(name: &str, config: &LoggingConfig) -> Result<Logger, LoggerError> {
    let mut builder = Logger::builder().name(name).console(config.console).json(config.json).level_name(&config.level)?;

    if let Some(filter) = &config.filter {
        builder = builder.env_filter(filter);
    }
    if let Some(directory) = &config.directory {
        builder = builder.directory(directory);
    }
    builder.init()
}
