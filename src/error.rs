//! Error types for praxis-mapper

use thiserror::Error;

/// Main error type for praxis-mapper operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing or a value cannot be used.
    ///
    /// The message is shown to API clients as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for praxis-mapper operations
pub type Result<T> = std::result::Result<T, Error>;
