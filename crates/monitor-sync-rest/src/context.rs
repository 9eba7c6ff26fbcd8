// crates/monitor-sync-rest/src/context.rs
// ============================================================================
// Module: Request Context
// Description: Per-operation deadline and cancellation signal.
// Purpose: Bound every remote call, including its retries, by one deadline.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`RequestContext`] is created once per lifecycle operation and passed to
//! every REST call made on its behalf. Retries and backoff waits observe the
//! same deadline and cancellation token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crate::error::RestError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Longest single sleep slice while waiting, so cancellation is noticed quickly.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Fallback horizon when a requested timeout overflows the clock.
const FAR_HORIZON: Duration = Duration::from_secs(24 * 60 * 60);

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Shared cancellation flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Set once cancellation is requested.
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Deadline and cancellation for one lifecycle operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Instant after which no further attempt is made.
    deadline: Instant,
    /// Caller-controlled cancellation.
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Creates a context expiring `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_cancellation(timeout, CancellationToken::new())
    }

    /// Creates a context expiring `timeout` from now that also observes `token`.
    #[must_use]
    pub fn with_cancellation(timeout: Duration, token: CancellationToken) -> Self {
        let now = Instant::now();
        let deadline =
            now.checked_add(timeout).or_else(|| now.checked_add(FAR_HORIZON)).unwrap_or(now);
        Self {
            deadline,
            cancellation: token,
        }
    }

    /// Returns the absolute deadline.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns the cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the time left before the deadline, or `None` once it passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.checked_duration_since(Instant::now()).filter(|left| !left.is_zero())
    }

    /// Returns the remaining time if the call may proceed.
    ///
    /// # Errors
    /// Returns [`RestError::Cancelled`] or [`RestError::Timeout`].
    pub fn check(&self) -> Result<Duration, RestError> {
        if self.cancellation.is_cancelled() {
            return Err(RestError::Cancelled);
        }
        self.remaining().ok_or(RestError::Timeout)
    }

    /// Waits for `delay` while watching cancellation and the deadline.
    ///
    /// A wait that would outlast the deadline fails immediately.
    ///
    /// # Errors
    /// Returns [`RestError::Cancelled`] or [`RestError::Timeout`].
    pub fn sleep(&self, delay: Duration) -> Result<(), RestError> {
        let remaining = self.check()?;
        if delay >= remaining {
            return Err(RestError::Timeout);
        }
        let wake = Instant::now() + delay;
        loop {
            if self.cancellation.is_cancelled() {
                return Err(RestError::Cancelled);
            }
            let Some(left) = wake.checked_duration_since(Instant::now()) else {
                return Ok(());
            };
            if left.is_zero() {
                return Ok(());
            }
            thread::sleep(left.min(SLEEP_SLICE));
        }
    }
}
