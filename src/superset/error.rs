//! Remote API error types.

use thiserror::Error;

/// Result type for Superset API calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while talking to Superset.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport failure, timeout, or undecodable response body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Superset answered with a non-success status.
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The configured base URL cannot be joined with an API path.
    #[error("invalid Superset URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid header value (e.g. a token with control characters).
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Any other failure reported by a client implementation.
    #[error("{0}")]
    Api(String),
}

impl RemoteError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }

    /// HTTP status code, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
