// crates/monitor-sync-resources/tests/dashboard_unit.rs
// ============================================================================
// Module: Dashboard And Website Monitoring Unit Tests
// Description: Custom dashboards and website monitoring configs.
// Purpose: Verify widget canonicalization and the name query parameter mode.
// ============================================================================

//! ## Overview
//! Custom dashboards store widgets as canonical JSON text so formatting-only
//! edits produce no diff. Website monitoring configs are created and updated
//! with the name carried as a query parameter.

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

use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::Resource;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::ResourceState;
use monitor_sync_core::new_managed_resource;
use monitor_sync_resources::CustomDashboardHandle;
use monitor_sync_resources::WebsiteMonitoringConfigHandle;
use monitor_sync_resources::custom_dashboard::AccessRule;
use monitor_sync_resources::custom_dashboard::CustomDashboard;
use monitor_sync_resources::custom_dashboard::FULL_TITLE;
use monitor_sync_resources::custom_dashboard::TITLE;
use monitor_sync_resources::custom_dashboard::WIDGETS;
use monitor_sync_resources::shared::NAME;
use monitor_sync_resources::website_monitoring_config::APP_NAME;
use serde_json::Value;
use serde_json::json;

use crate::common::Scripted;
use crate::common::ScriptedServer;
use crate::common::provider_meta;
use crate::common::round_trip;

/// Formatter adding a prefix to dashboard titles.
fn formatter() -> NameFormatter {
    NameFormatter::new("[ops] ", "")
}

/// Dashboard shared globally for reading and with one user for editing.
fn dashboard() -> CustomDashboard {
    CustomDashboard {
        id: "dashboard-1".to_string(),
        title: "[ops] latency".to_string(),
        access_rules: vec![
            AccessRule {
                access_type: "READ".to_string(),
                relation_type: "GLOBAL".to_string(),
                related_id: None,
            },
            AccessRule {
                access_type: "READ_WRITE".to_string(),
                relation_type: "USER".to_string(),
                related_id: Some("user-1".to_string()),
            },
        ],
        widgets: json!([{ "id": "w1", "type": "chart", "config": { "y": 2, "x": 1 } }]),
    }
}

// ============================================================================
// SECTION: Custom Dashboards
// ============================================================================

#[test]
fn dashboard_round_trips_with_canonical_widgets() {
    let handle = CustomDashboardHandle::new();
    let model = dashboard();

    let (state, mapped) = round_trip(&handle, &model, &formatter());

    assert_eq!(state.string(TITLE).as_deref(), Some("latency"));
    assert_eq!(state.string(FULL_TITLE).as_deref(), Some("[ops] latency"));
    assert_eq!(
        state.string(WIDGETS).as_deref(),
        Some(r#"[{"config":{"x":1,"y":2},"id":"w1","type":"chart"}]"#)
    );
    assert_eq!(state.blocks("access_rule").len(), 2);
    assert_eq!(mapped, model);
}

#[test]
fn reformatted_widgets_produce_no_diff() {
    let handle = CustomDashboardHandle::new();
    let (state, _) = round_trip(&handle, &dashboard(), &formatter());
    let mut edited = state.values().clone();
    edited.insert(
        WIDGETS.to_string(),
        Value::String(
            "[\n  {\"type\": \"chart\", \"id\": \"w1\", \"config\": {\"x\": 1, \"y\": 2}}\n]"
                .to_string(),
        ),
    );

    assert!(handle.metadata().schema.diff(state.values(), &edited).is_empty());

    edited.insert(WIDGETS.to_string(), Value::String("[]".to_string()));
    assert_eq!(handle.metadata().schema.diff(state.values(), &edited), vec![WIDGETS]);
}

#[test]
fn invalid_widget_json_fails_validation() {
    let handle = CustomDashboardHandle::new();
    let (state, _) = round_trip(&handle, &dashboard(), &formatter());
    let mut values = state.values().clone();
    values.insert(WIDGETS.to_string(), Value::String("{not json".to_string()));

    assert!(handle.metadata().schema.validate(&values).is_err());
}

#[test]
fn dashboard_without_access_rules_fails_validation() {
    let handle = CustomDashboardHandle::new();
    let (state, _) = round_trip(&handle, &dashboard(), &formatter());
    let mut values = state.values().clone();
    values.insert("access_rule".to_string(), json!([]));

    assert!(handle.metadata().schema.validate(&values).is_err());
}

// ============================================================================
// SECTION: Website Monitoring Configs
// ============================================================================

#[test]
fn website_monitoring_create_sends_the_name_as_query_parameter() {
    let body = json!({ "id": "website-1", "name": "shop", "appName": "shop-app" });
    let server = ScriptedServer::start(vec![Scripted::json(200, &body.to_string())]);
    let meta = provider_meta(&server.endpoint, "", "");
    let resource = new_managed_resource(WebsiteMonitoringConfigHandle::new()).unwrap();
    let mut state = ResourceState::new(0);
    state.set(NAME, "shop");

    resource.create(&mut state, &meta, &meta.request_context()).unwrap();

    assert_eq!(state.id(), "website-1");
    assert_eq!(state.string(APP_NAME).as_deref(), Some("shop-app"));
    let requests = server.finish();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/api/website-monitoring/config?name=shop");
    assert!(requests[0].body.is_empty());
}

#[test]
fn website_monitoring_delete_tolerates_a_missing_entity() {
    let server = ScriptedServer::start(vec![Scripted::empty(404)]);
    let meta = provider_meta(&server.endpoint, "", "");
    let resource = new_managed_resource(WebsiteMonitoringConfigHandle::new()).unwrap();
    let mut state = ResourceState::new(0);
    state.set_id("website-1");
    state.set(NAME, "shop");

    resource.delete(&mut state, &meta, &meta.request_context()).unwrap();

    assert_eq!(state.id(), "");
    let requests = server.finish();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].url, "/api/website-monitoring/config/website-1");
}
