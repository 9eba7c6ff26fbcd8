//! Wire conversion property-based tests.
//!
//! ## Purpose
//! Tag CSV and header line conversions are stable for arbitrary input, so a
//! value read back from the remote never produces a spurious diff.
// crates/monitor-sync-resources/tests/proptest_conversions.rs
// ============================================================================
// Module: Wire Conversion Property-Based Tests
// Description: OpsGenie tag CSV and webhook header line conversions.
// Purpose: Ensure split/join and parse/render reach a fixed point.
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

use std::collections::BTreeMap;

use monitor_sync_resources::alerting_channel::join_tags;
use monitor_sync_resources::alerting_channel::parse_headers;
use monitor_sync_resources::alerting_channel::render_headers;
use monitor_sync_resources::alerting_channel::split_tags;
use proptest::prelude::*;

proptest! {
    #[test]
    fn split_tags_is_idempotent_through_join(csv in "[a-z ,]{0,40}") {
        let tags = split_tags(&csv);
        prop_assert!(tags.iter().all(|tag| !tag.is_empty() && tag.trim() == tag));
        prop_assert_eq!(split_tags(&join_tags(&tags)), tags);
    }

    #[test]
    fn rendered_headers_parse_back(
        headers in prop::collection::btree_map("[A-Za-z-]{1,12}", "[ -~]{0,24}", 0 .. 6),
    ) {
        let headers: BTreeMap<String, String> =
            headers.into_iter().map(|(key, value)| (key, value.trim().to_string())).collect();
        prop_assert_eq!(parse_headers(&render_headers(&headers)), headers);
    }
}
