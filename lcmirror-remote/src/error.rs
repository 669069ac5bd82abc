//! Error types for lcmirror-remote.

use lcmirror_core::StoreError;
use thiserror::Error;

/// Failures while talking to the archive service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure; always retryable.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status other than 401/403.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The service rejected the session (401/403).
    #[error("session rejected by {url} (HTTP {status}); run `lcmirror login`")]
    Unauthorized { url: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// GraphQL answered 200 with an `errors` array and no data.
    #[error("GraphQL {operation} failed: {message}")]
    GraphQl { operation: String, message: String },

    /// Every attempt allowed by the retry policy failed.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    /// Reading or writing the local metadata cache failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Failures while establishing an authenticated session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The interactive login collaborator could not produce credentials.
    #[error("interactive login failed: {0}")]
    LoginFailed(String),

    /// Credentials were obtained but the service does not accept them.
    #[error("the service did not accept the supplied session cookies")]
    Rejected,

    /// The stored session could not be read or the new one not persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}
