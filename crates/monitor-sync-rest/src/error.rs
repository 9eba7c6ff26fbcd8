// crates/monitor-sync-rest/src/error.rs
// ============================================================================
// Module: REST Errors
// Description: Failure classification for remote API calls.
// Purpose: Give callers a typed view of not-found, retryable, and fatal errors.
// Dependencies: thiserror
// ============================================================================

//! Failure classification for remote API calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the REST client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestError {
    /// The remote returned 404 for the requested entity.
    #[error("entity not found")]
    NotFound,
    /// Network, DNS, or TLS failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote kept answering 429 until retries ran out.
    #[error("too many requests: {0}")]
    RateLimited(String),
    /// The remote answered with a 5xx status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The remote rejected the request with a non-retryable status.
    #[error("request rejected with status {status}: {message}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),
    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// The decoded object failed its own consistency check.
    #[error("invalid object received: {0}")]
    InvalidObject(String),
    /// The caller cancelled the call.
    #[error("request cancelled")]
    Cancelled,
    /// The call deadline passed.
    #[error("request deadline exceeded")]
    Timeout,
    /// The client could not be built from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl RestError {
    /// Returns true for [`RestError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
