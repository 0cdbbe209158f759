//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tsconfig not found: {0}")]
    TsConfigNotFound(PathBuf),

    #[error("invalid tsconfig '{path}': {message}")]
    InvalidTsConfig { path: PathBuf, message: String },

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
