// crates/monitor-sync-resources/tests/synthetic_test_unit.rs
// ============================================================================
// Module: Synthetic Test Unit Tests
// Description: HTTP action and script configurations.
// Purpose: Verify configuration blocks, defaults, and read behaviour.
// ============================================================================

//! ## Overview
//! Round-trips both synthetic configuration kinds, checks the field defaults
//! and retry bounds, and reads a test that no longer exists remotely.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::Resource;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::ResourceState;
use monitor_sync_core::new_managed_resource;
use monitor_sync_resources::SyntheticTestHandle;
use monitor_sync_resources::shared::into_block;
use monitor_sync_resources::synthetic_test::CONFIGURATION_AXIS;
use monitor_sync_resources::synthetic_test::SyntheticConfiguration;
use monitor_sync_resources::synthetic_test::SyntheticKind;
use monitor_sync_resources::synthetic_test::SyntheticTest;
use serde_json::json;

use crate::common::Scripted;
use crate::common::ScriptedServer;
use crate::common::populated_blocks;
use crate::common::provider_meta;
use crate::common::round_trip;

/// Formatter without affixes; synthetic labels are never formatted.
fn formatter() -> NameFormatter {
    NameFormatter::new("prefix ", "")
}

/// Test running `kind` from two locations.
fn synthetic(kind: SyntheticKind) -> SyntheticTest {
    SyntheticTest {
        id: "synthetic-1".to_string(),
        label: "checkout probe".to_string(),
        description: Some("Checks the checkout page".to_string()),
        active: true,
        application_id: None,
        configuration: SyntheticConfiguration {
            mark_synthetic_call: true,
            retries: Some(2),
            retry_interval: Some(5),
            timeout: Some("30s".to_string()),
            kind,
        },
        custom_properties: [("team".to_string(), "payments".to_string())].into_iter().collect(),
        locations: vec!["loc-eu".to_string(), "loc-us".to_string()],
        playback_mode: "Staggered".to_string(),
        test_frequency: 5,
    }
}

// ============================================================================
// SECTION: Configurations
// ============================================================================

#[test]
fn http_action_round_trips() {
    let handle = SyntheticTestHandle::new();
    let headers: BTreeMap<String, String> =
        [("Accept".to_string(), "text/html".to_string())].into_iter().collect();
    let model = synthetic(SyntheticKind::HttpAction {
        url: "https://shop.example.com/checkout".to_string(),
        operation: Some("GET".to_string()),
        headers,
        body: None,
        validation_string: Some("Pay now".to_string()),
        follow_redirect: Some(true),
        allow_insecure: None,
        expect_status: Some(200),
        expect_match: None,
    });

    let (state, mapped) = round_trip(&handle, &model, &formatter());

    assert_eq!(state.string("label").as_deref(), Some("checkout probe"));
    assert_eq!(populated_blocks(state.values(), &CONFIGURATION_AXIS), vec!["http_action"]);
    let action = state.block("http_action").unwrap();
    assert_eq!(action.int("retries"), Some(2));
    assert_eq!(action.bool("allow_insecure"), None);
    assert_eq!(mapped, model);
}

#[test]
fn http_script_round_trips() {
    let handle = SyntheticTestHandle::new();
    let model = synthetic(SyntheticKind::HttpScript {
        script: "await $http.get('https://shop.example.com');".to_string(),
    });

    let (state, mapped) = round_trip(&handle, &model, &formatter());

    assert_eq!(populated_blocks(state.values(), &CONFIGURATION_AXIS), vec!["http_script"]);
    assert!(state.blocks("http_action").is_empty());
    assert_eq!(mapped, model);
}

#[test]
fn unset_fields_take_their_defaults() {
    let handle = SyntheticTestHandle::new();
    let raw = into_block(json!({
        "label": "ping",
        "locations": ["loc-eu"],
        "http_script": [{ "script": "ping()" }]
    }));
    let mut state = ResourceState::new(0);
    state.set_values(handle.metadata().schema.normalize(&raw));

    let model = handle.map_state_to_model(&state, &formatter()).unwrap();

    assert!(model.active);
    assert_eq!(model.playback_mode, "Simultaneous");
    assert_eq!(model.test_frequency, 15);
    assert!(!model.configuration.mark_synthetic_call);
    assert!(handle.metadata().schema.validate(state.values()).is_ok());
}

#[test]
fn retries_above_two_fail_validation() {
    let handle = SyntheticTestHandle::new();
    let values = into_block(json!({
        "label": "ping",
        "locations": ["loc-eu"],
        "http_action": [{ "url": "https://example.com", "retries": 3 }]
    }));

    let err = handle.metadata().schema.validate(&values).unwrap_err();

    assert!(err.to_string().contains("http_action.0.retries"), "{err}");
}

#[test]
fn both_configuration_blocks_are_rejected() {
    let handle = SyntheticTestHandle::new();
    let mut state = ResourceState::new(0);
    state.set_values(into_block(json!({
        "label": "ping",
        "locations": ["loc-eu"],
        "http_action": [{ "url": "https://example.com" }],
        "http_script": [{ "script": "ping()" }]
    })));

    let err = handle.map_state_to_model(&state, &formatter()).unwrap_err();

    assert_eq!(err.to_string(), "more than one synthetic test configuration defined");
}

// ============================================================================
// SECTION: Remote
// ============================================================================

#[test]
fn read_of_a_deleted_test_clears_the_id() {
    let server = ScriptedServer::start(vec![Scripted::empty(404)]);
    let meta = provider_meta(&server.endpoint, "", "");
    let resource = new_managed_resource(SyntheticTestHandle::new()).unwrap();
    let mut state = ResourceState::new(0);
    state.set_id("synthetic-1");
    state.set("label", "ping");

    resource.read(&mut state, &meta, &meta.request_context()).unwrap();

    assert_eq!(state.id(), "");
    let requests = server.finish();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/api/synthetics/settings/tests/synthetic-1");
}
