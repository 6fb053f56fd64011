//! Common error types for the browser scoreboard

use thiserror::Error;

/// Common result type for scoreboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across scoreboard crates
#[derive(Error, Debug)]
pub enum Error {
    /// A dataset source could not be read or parsed.
    ///
    /// The whole load is considered failed; no partial dataset is exposed.
    #[error("Data unavailable ({resource}): {reason}")]
    DataUnavailable { resource: String, reason: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Preference store read/write error
    #[error("Preferences error: {0}")]
    Preferences(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Build a `DataUnavailable` error for a named resource
    pub fn unavailable(resource: impl Into<String>, reason: impl ToString) -> Self {
        Error::DataUnavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// True if this error means the dataset could not be loaded
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable { .. })
    }
}
