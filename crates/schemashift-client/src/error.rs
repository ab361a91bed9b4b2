//! Client error types.

use thiserror::Error;

/// Remote API client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (DNS, connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("api error: status {status}: {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body, or a short placeholder when unreadable.
        message: String,
    },

    /// The requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Payload (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// App-token exchange failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error is a not-found response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
