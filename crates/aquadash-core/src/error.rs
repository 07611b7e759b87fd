//! Error types for aquadash-core.
//!
//! Network and parse failures inside the gateway's fail-soft fetchers are
//! absorbed at the gateway boundary and never reach the reconciler; the
//! variants here surface only from the fallible APIs (gateway construction,
//! actuator submission, preference file loading).

/// Errors that can occur in the Aquadash core.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The gateway base URL is malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body, if any.
        message: String,
    },

    /// Preference storage could not be read or written.
    #[error("preference storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Persisted preference data could not be decoded.
    #[error("preference decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for aquadash-core operations.
pub type Result<T> = std::result::Result<T, Error>;
