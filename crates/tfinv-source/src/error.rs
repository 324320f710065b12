//! Error types for state sources

use thiserror::Error;

/// Errors that can occur while fetching a state document
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Address cannot carry a key path
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Reading a local file or stdin failed
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored value is not valid base64
    #[error("Invalid base64 value: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Key/value store returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// No state stored under the key
    #[error("no state found at key {0}")]
    NotFound(String),
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
