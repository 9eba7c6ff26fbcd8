// crates/monitor-sync-rest/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Attempt limits and exponential backoff for transient failures.
// Purpose: Decide how long to wait between attempts of one REST call.
// Dependencies: std
// ============================================================================

//! Attempt limits and exponential backoff for transient failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Retry settings shared by every call of a client.
///
/// # Invariants
/// - `max_attempts` counts the first attempt; `1` disables retries.
/// - Computed backoff never exceeds `max_backoff`; server-requested waits are
///   bounded only by the call deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Wait after the first failed attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single wait.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Returns the wait after the given failed attempt (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Returns the wait requested by a `Retry-After` header.
    ///
    /// Only the delta-seconds form is honoured.
    #[must_use]
    pub fn retry_after(header: Option<&str>) -> Option<Duration> {
        let seconds = header?.trim().parse::<u64>().ok()?;
        Some(Duration::from_secs(seconds))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
