//! Question source error types.

use thiserror::Error;

/// Errors that can occur while fetching a question set.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file or URL does not exist.
    #[error("question source not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The payload was not a valid question set.
    #[error("invalid question set from {location}: {reason}")]
    InvalidFormat { location: String, reason: String },
}
