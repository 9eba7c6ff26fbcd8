//! Name formatter property-based tests.
//!
//! ## Purpose
//! Short names survive a format/undo round trip for arbitrary affixes, and
//! the full name sent for an unchanged state is the stored one.
// crates/monitor-sync-core/tests/proptest_naming.rs
// ============================================================================
// Module: Name Formatter Property-Based Tests
// Description: Inverse relation of format and undo_format.
// Purpose: Ensure undo_format(format(s)) == s for every prefix and suffix.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use monitor_sync_core::NameFormatter;
use monitor_sync_core::ResourceState;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;

proptest! {
    #[test]
    fn undo_format_inverts_format(
        prefix in "[ -~]{0,8}",
        suffix in "[ -~]{0,12}",
        short in "\\PC{0,24}",
    ) {
        let formatter = NameFormatter::new(prefix, suffix);
        prop_assert_eq!(formatter.undo_format(&formatter.format(&short)), short);
    }

    #[test]
    fn unchanged_name_keeps_stored_full_name(
        short in "[a-z]{1,12}",
        stored in "[A-Za-z ]{1,24}",
        suffix in "[ -~]{0,12}",
    ) {
        let mut values = Map::new();
        values.insert("name".to_string(), Value::String(short.clone()));
        values.insert("full_name".to_string(), Value::String(stored.clone()));
        let mut state = ResourceState::applied("id-1", 0, values);
        let formatter = NameFormatter::new("new ", suffix);

        prop_assert_eq!(formatter.full_name_for(&state, "name", "full_name"), stored);

        state.set("name", format!("{short}x"));
        prop_assert_eq!(
            formatter.full_name_for(&state, "name", "full_name"),
            formatter.format(&format!("{short}x"))
        );
    }
}
