//! Error types for workflow config loading.

use thiserror::Error;

/// Errors that can occur while loading a workflow config file.
#[derive(Error, Debug)]
pub enum Error {
    /// The config file is missing.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// The file is not valid YAML.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A workflow entry has the wrong shape.
    #[error("Malformed workflow entry: {0}")]
    Malformed(String),

    /// IO error while reading the config or a prompt file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert into the engine-level error for callers working across crates.
impl From<Error> for switchyard_core::Error {
    fn from(err: Error) -> Self {
        switchyard_core::Error::Config(err.to_string())
    }
}
