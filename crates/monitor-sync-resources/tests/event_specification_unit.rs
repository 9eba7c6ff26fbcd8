// crates/monitor-sync-resources/tests/event_specification_unit.rs
// ============================================================================
// Module: Custom Event Specification Unit Tests
// Description: Rule variants, metric selectors, and stored state upgrades.
// Purpose: Verify the single-rule contract and the threshold rule boundaries.
// ============================================================================

//! ## Overview
//! Covers threshold rules selected by metric name or pattern, the `=`
//! operator spelling, the single-rule requirement, and the version 0 upgrade.

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

use monitor_sync_core::ErrorKind;
use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::Resource;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::ResourceState;
use monitor_sync_core::new_managed_resource;
use monitor_sync_resources::CustomEventSpecificationHandle;
use monitor_sync_resources::custom_event_specification::CustomEventSpecification;
use monitor_sync_resources::custom_event_specification::MetricPattern;
use monitor_sync_resources::custom_event_specification::RULE_AXIS;
use monitor_sync_resources::custom_event_specification::Rule;
use monitor_sync_resources::custom_event_specification::SCHEMA_VERSION;
use monitor_sync_resources::shared::RULE;
use monitor_sync_resources::shared::into_block;
use serde_json::Value;
use serde_json::json;

use crate::common::populated_blocks;
use crate::common::round_trip;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Formatter without affixes.
fn formatter() -> NameFormatter {
    NameFormatter::new("", "")
}

/// Specification wrapping one rule.
fn specification(rules: Vec<Rule>) -> CustomEventSpecification {
    CustomEventSpecification {
        id: "spec-1".to_string(),
        name: "disk usage".to_string(),
        entity_type: "host".to_string(),
        query: Some("entity.zone:eu".to_string()),
        triggering: false,
        description: None,
        expiration_time: Some(60_000),
        enabled: true,
        rules,
    }
}

/// Threshold rule selected by a metric pattern.
fn pattern_rule() -> Rule {
    Rule::Threshold {
        severity: 10,
        metric_name: None,
        metric_pattern: Some(MetricPattern {
            prefix: "fs".to_string(),
            postfix: Some("used".to_string()),
            placeholder: Some("/var".to_string()),
            operator: "startsWith".to_string(),
        }),
        rollup: None,
        window: Some(300_000),
        aggregation: Some("max".to_string()),
        condition_operator: ">".to_string(),
        condition_value: Some(0.9),
    }
}

/// State holding a threshold rule block built from `rule`.
fn threshold_state(rule: Value) -> ResourceState {
    let mut state = ResourceState::new(SCHEMA_VERSION);
    state.set_values(into_block(json!({
        "name": "disk usage",
        "entity_type": "host",
        "enabled": true,
        "rule": [{ "threshold": [rule] }]
    })));
    state
}

// ============================================================================
// SECTION: Rules
// ============================================================================

#[test]
fn threshold_rule_with_metric_pattern_round_trips() {
    let handle = CustomEventSpecificationHandle::new();
    let model = specification(vec![pattern_rule()]);

    let (state, mapped) = round_trip(&handle, &model, &formatter());

    let container = state.block(RULE).unwrap();
    assert_eq!(populated_blocks(container.values(), &RULE_AXIS), vec!["threshold"]);
    let threshold = container.block("threshold").unwrap();
    assert_eq!(threshold.string("severity").as_deref(), Some("critical"));
    assert_eq!(threshold.string("metric_name"), None);
    let pattern = threshold.block("metric_pattern").unwrap();
    assert_eq!(pattern.string("prefix").as_deref(), Some("fs"));
    assert_eq!(pattern.string("operator").as_deref(), Some("startsWith"));
    assert_eq!(mapped, model);
}

#[test]
fn system_and_entity_verification_rules_round_trip() {
    let handle = CustomEventSpecificationHandle::new();
    let rules = [
        Rule::System {
            severity: 5,
            system_rule_id: "system-rule-1".to_string(),
        },
        Rule::EntityVerification {
            severity: 10,
            matching_entity_type: "process".to_string(),
            matching_operator: "is".to_string(),
            matching_entity_label: "nginx".to_string(),
            offline_duration: 60_000,
        },
    ];

    for rule in rules {
        let model = specification(vec![rule]);
        let (_, mapped) = round_trip(&handle, &model, &formatter());
        assert_eq!(mapped, model);
    }
}

#[test]
fn single_equals_operator_is_stored_as_double_equals() {
    let handle = CustomEventSpecificationHandle::new();
    let model = specification(vec![Rule::Threshold {
        severity: 5,
        metric_name: Some("cpu.user".to_string()),
        metric_pattern: None,
        rollup: Some(1_000),
        window: None,
        aggregation: Some("avg".to_string()),
        condition_operator: "=".to_string(),
        condition_value: Some(1.0),
    }]);

    let (state, mapped) = round_trip(&handle, &model, &formatter());

    let threshold = state.block(RULE).unwrap().block("threshold").unwrap().values().clone();
    assert_eq!(threshold["condition_operator"], "==");
    let Rule::Threshold {
        condition_operator,
        ..
    } = &mapped.rules[0]
    else {
        panic!("expected a threshold rule");
    };
    assert_eq!(condition_operator, "==");
}

#[test]
fn metric_name_and_pattern_together_are_rejected() {
    let handle = CustomEventSpecificationHandle::new();
    let state = threshold_state(json!({
        "severity": "warning",
        "metric_name": "cpu.user",
        "metric_pattern": [{ "prefix": "cpu", "operator": "is" }],
        "condition_operator": ">"
    }));

    let err = handle.map_state_to_model(&state, &formatter()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "metric_name and metric_pattern cannot both be set");
    assert!(handle.metadata().schema.validate(state.values()).is_err());
}

#[test]
fn missing_metric_selector_is_rejected() {
    let handle = CustomEventSpecificationHandle::new();
    let state = threshold_state(json!({
        "severity": "warning",
        "condition_operator": ">"
    }));

    let err = handle.map_state_to_model(&state, &formatter()).unwrap_err();

    assert_eq!(err.to_string(), "either metric_name or metric_pattern must be set");
}

#[test]
fn remote_with_several_rules_is_rejected() {
    let handle = CustomEventSpecificationHandle::new();
    let model = specification(vec![pattern_rule(), pattern_rule()]);
    let mut state = ResourceState::new(SCHEMA_VERSION);

    let err = handle.update_state(&mut state, &model, &formatter()).unwrap_err();

    assert_eq!(err.to_string(), "more than one rule defined");
    assert!(state.values().is_empty());
}

// ============================================================================
// SECTION: Upgrades
// ============================================================================

#[test]
fn version_zero_state_drops_downstream_integrations() {
    let resource = new_managed_resource(CustomEventSpecificationHandle::new()).unwrap();
    let raw = into_block(json!({
        "name": "disk usage",
        "entity_type": "host",
        "downstream_integration_ids": ["integration-1"]
    }));

    let upgraded = resource.upgrade(raw, 0).unwrap();

    assert!(!upgraded.contains_key("downstream_integration_ids"));
    assert_eq!(upgraded["name"], "disk usage");
    assert_eq!(upgraded["enabled"], true);
}

#[test]
fn state_from_a_newer_version_is_refused() {
    let resource = new_managed_resource(CustomEventSpecificationHandle::new()).unwrap();

    let err = resource.upgrade(into_block(json!({ "name": "x" })), SCHEMA_VERSION + 1).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Migration);
}
