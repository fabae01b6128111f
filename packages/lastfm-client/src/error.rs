//! Last.fm API error types

use thiserror::Error;

/// Last.fm API client errors
#[derive(Error, Debug)]
pub enum LastfmError {
    /// API key is missing or invalid
    #[error("API key is required for Last.fm API access")]
    MissingApiKey,

    /// Invalid input provided to API method
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pagination parameters violate a planner precondition
    #[error("Invalid pagination configuration: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-success status without an error payload
    #[error("Last.fm returned HTTP {status} for {method}")]
    Status {
        /// HTTP status code
        status: u16,
        /// API method that was being called
        method: String,
    },

    /// Response did not match the expected schema
    #[error("Failed to parse Last.fm response as {expected}: {source}")]
    Parse {
        /// Name of the response shape that was expected
        expected: &'static str,
        /// Underlying deserialization error
        source: serde_json::Error,
    },

    /// Last.fm API returned an error payload
    #[error("Last.fm API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Track not found
    #[error("Track not found: {artist} - {track}")]
    TrackNotFound { artist: String, track: String },

    /// Rate limited by Last.fm
    #[error("Rate limited by Last.fm API")]
    RateLimited,

    /// Request timeout
    #[error("Request to Last.fm timed out")]
    Timeout,
}

impl LastfmError {
    /// Check if this error is a transient failure
    ///
    /// The client itself never retries; this classification exists for
    /// callers that layer their own retry policy on top.
    ///
    /// Transient:
    /// - Timeouts
    /// - Rate limiting
    /// - Transport errors (connect, timeout)
    /// - Server errors (5xx)
    ///
    /// Schema mismatches and upstream error payloads are never transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            LastfmError::Timeout | LastfmError::RateLimited => true,
            LastfmError::Status { status, .. } => *status >= 500,
            LastfmError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            _ => false,
        }
    }
}

/// Result type for Last.fm operations
pub type LastfmResult<T> = Result<T, LastfmError>;
