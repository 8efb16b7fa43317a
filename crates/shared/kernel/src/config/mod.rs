use config::{Config, Environment, File, FileFormat, FileSourceFile};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `SCHOLAR__STORAGE__DATA_DIR`.
pub const ENV_PREFIX: &str = "SCHOLAR";
/// Base name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "registrar";

#[scholar_derive::scholar_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a configuration file overlaid with environment variables.
///
/// 1. **Base file**: `path`, or `registrar` (any extension `config` understands) in the working
///    directory. The file is required.
/// 2. **Environment**: variables prefixed with `SCHOLAR__`; nested keys are separated by `__`
///    (`SCHOLAR__GRADING__PASSING_AVERAGE=6.5` maps to `grading.passing_average`).
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing or the merged values do not
/// deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = effective_path(path);
    info!("Loading config from {}", path.display());
    build(File::from(path.as_path()).required(true), environment())
}

/// Like [`load_config`], but a missing file is not an error: serde defaults plus environment
/// overrides are used instead.
///
/// # Errors
/// Returns [`ConfigError::Config`] when an existing file or an override is malformed.
pub fn load_config_or_default<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = effective_path(path);
    info!("Loading optional config from {}", path.display());
    build(File::from(path.as_path()).required(false), environment())
}

fn effective_path(path: Option<impl AsRef<Path>>) -> PathBuf {
    path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true)
}

fn build<T>(file: File<FileSourceFile, FileFormat>, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
