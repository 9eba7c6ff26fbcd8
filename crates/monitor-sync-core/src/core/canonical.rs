// crates/monitor-sync-core/src/core/canonical.rs
// ============================================================================
// Module: Canonical JSON
// Description: RFC 8785 canonical rendering of opaque JSON documents.
// Purpose: Compare and store opaque payloads independent of key order.
// Dependencies: serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! Opaque JSON text (dashboard widgets) is stored in canonical form: keys
//! sorted, insignificant whitespace removed, numbers in their shortest form.
//! Two documents are equivalent iff their canonical forms are equal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::error::SyncError;

// ============================================================================
// SECTION: Canonicalization
// ============================================================================

/// Renders a JSON value canonically.
///
/// # Errors
/// Returns [`SyncError::Parse`] when the value cannot be serialized.
pub fn canonical_value(value: &Value) -> Result<String, SyncError> {
    serde_jcs::to_string(value).map_err(|err| SyncError::Parse(err.to_string()))
}

/// Parses JSON text and renders it canonically.
///
/// # Errors
/// Returns [`SyncError::Parse`] when the text is not valid JSON.
pub fn canonicalize(text: &str) -> Result<String, SyncError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| SyncError::Parse(format!("invalid JSON: {err}")))?;
    canonical_value(&value)
}

/// Returns true when both texts are valid JSON with equal canonical forms.
#[must_use]
pub fn equivalent(left: &str, right: &str) -> bool {
    match (canonicalize(left), canonicalize(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
