//! Error types for the file watch trigger.

use thiserror::Error;

/// Errors that can occur while setting up or running a file watch.
#[derive(Error, Debug)]
pub enum Error {
    /// Watch root does not exist or cannot be resolved.
    #[error("Watch path does not exist: {0}")]
    InvalidPath(String),

    /// Underlying OS notification error.
    #[error("File watching error: {0}")]
    Notify(String),

    /// Invalid glob pattern in the configuration.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The trigger was started while already watching.
    #[error("File watch trigger is already running")]
    AlreadyRunning,

    /// IO error while resolving the watch path.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for watch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert notify errors to our error type.
impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Notify(err.to_string())
    }
}

/// Convert globset errors to our error type.
impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}

/// Surface watch failures through the engine's error type.
impl From<Error> for switchyard_core::Error {
    fn from(err: Error) -> Self {
        switchyard_core::Error::Trigger(err.to_string())
    }
}
