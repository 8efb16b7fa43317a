//! Kernel utilities shared across Scholar crates.
//! Keep this crate lightweight; today it owns layered configuration loading.
//!
//! ## Config loading
//! ```rust,no_run
//! use scholar_kernel::config::load_config;
//! use scholar_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = load_config(Some("registrar.toml")).unwrap_or_default();
//! ```

pub mod config;

pub use scholar_domain as domain;
