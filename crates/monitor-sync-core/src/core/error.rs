// crates/monitor-sync-core/src/core/error.rs
// ============================================================================
// Module: Sync Errors
// Description: Error taxonomy surfaced by handles and the CRUD driver.
// Purpose: Classify failures without exposing transport internals.
// Dependencies: monitor-sync-rest, tag-filter, thiserror
// ============================================================================

//! ## Overview
//! [`SyncError`] is returned by every handle and driver operation.
//! [`SyncError::kind`] folds transport details into the stable
//! [`ErrorKind`] set the host orchestrator reasons about.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_rest::RestError;
use tag_filter::TagFilterError;
use thiserror::Error;

// ============================================================================
// SECTION: Error Types
// ============================================================================

/// Errors raised while synchronizing a resource.
///
/// # Invariants
/// - Validation, parse, and migration failures are raised before any remote
///   call is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Schema validation, variant selection, or enum lookup failed.
    #[error("{0}")]
    Validation(String),
    /// A tag filter or JSON document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// A state upgrader failed or no upgrade path exists.
    #[error("state migration failed: {0}")]
    Migration(String),
    /// An operation requiring an existing resource got an empty ID.
    #[error("ID missing")]
    MissingId,
    /// The remote call failed.
    #[error(transparent)]
    Rest(#[from] RestError),
}

impl SyncError {
    /// Convenience constructor for validation errors.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns the stable classification of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::MissingId => ErrorKind::Validation,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Migration(_) => ErrorKind::Migration,
            Self::Rest(rest) => match rest {
                RestError::NotFound => ErrorKind::NotFound,
                RestError::Transport(_) => ErrorKind::Transport,
                RestError::RateLimited(_) => ErrorKind::RateLimited,
                RestError::Server { .. } => ErrorKind::ServerError,
                RestError::Client { .. } => ErrorKind::ClientError,
                RestError::Encode(_) | RestError::Decode(_) | RestError::InvalidObject(_) => {
                    ErrorKind::Parse
                }
                RestError::Cancelled => ErrorKind::Cancelled,
                RestError::Timeout => ErrorKind::Timeout,
                RestError::Config(_) => ErrorKind::Configuration,
            },
        }
    }

    /// Returns true when the remote reported the entity as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Rest(RestError::NotFound))
    }
}

impl From<TagFilterError> for SyncError {
    fn from(err: TagFilterError) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Stable failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected before contacting the remote.
    Validation,
    /// The remote entity does not exist.
    NotFound,
    /// Network, DNS, or TLS failure.
    Transport,
    /// The remote throttled the caller.
    RateLimited,
    /// The remote failed with a 5xx status.
    ServerError,
    /// The remote rejected the request with a 4xx status.
    ClientError,
    /// Malformed tag filter or JSON.
    Parse,
    /// State upgrade failure.
    Migration,
    /// The orchestrator cancelled the call.
    Cancelled,
    /// The call deadline passed.
    Timeout,
    /// The provider configuration is unusable.
    Configuration,
}
