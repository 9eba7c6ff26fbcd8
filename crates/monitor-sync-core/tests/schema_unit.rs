// crates/monitor-sync-core/tests/schema_unit.rs
// ============================================================================
// Module: Schema Unit Tests
// Description: Validation, normalization, and diff behaviour of schemas.
// Purpose: Pin the error messages and canonical forms resources rely on.
// ============================================================================

//! Validation, normalization, and diff behaviour of schemas.

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

use monitor_sync_core::Field;
use monitor_sync_core::Schema;
use monitor_sync_core::Validator;
use monitor_sync_core::ValueType;
use monitor_sync_core::core::schema::canonical_json_state;
use monitor_sync_core::core::schema::normalized_tag_filter_state;
use monitor_sync_core::core::schema::suppress_equivalent_json;
use monitor_sync_core::core::schema::suppress_equivalent_tag_filter;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn header_schema() -> Schema {
    Schema::new([
        ("key", Field::string().required()),
        ("value", Field::string().required()),
    ])
}

fn channel_schema() -> Schema {
    let group = ["email", "webhook"];
    Schema::new([
        ("name", Field::string().required().validate(Validator::StringLength { min: 1, max: 256 })),
        ("email", Field::set(ValueType::String).exactly_one_of(&group)),
        ("webhook", Field::set(ValueType::String).exactly_one_of(&group)),
        ("headers", Field::block_list(header_schema()).max_items(20)),
        ("severity", Field::string().validate(Validator::OneOf(&["warning", "critical"]))),
        ("granularity", Field::int().default_value(600_000).validate(Validator::IntOneOf(&[
            300_000, 600_000, 900_000,
        ]))),
        ("query", Field::string().conflicts_with(&["entity_id"])),
        ("entity_id", Field::string()),
        ("widgets", Field::string().validate(Validator::Json).state_func(canonical_json_state)),
        (
            "tag_filter",
            Field::string()
                .validate(Validator::TagFilter)
                .diff_suppress(suppress_equivalent_tag_filter)
                .state_func(normalized_tag_filter_state),
        ),
        ("remote_id", Field::string().computed()),
    ])
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn valid_configuration_passes() {
    let schema = channel_schema();
    let values = object(json!({
        "name": "ops",
        "email": ["a@example.com"],
        "severity": "critical",
        "widgets": "{\"b\":1,\"a\":2}",
        "tag_filter": "entity.type EQUALS 'host'",
    }));
    schema.validate(&values).unwrap();
}

#[test]
fn missing_required_field_is_reported() {
    let schema = channel_schema();
    let err = schema.validate(&object(json!({"email": ["a@example.com"]}))).unwrap_err();
    assert_eq!(err.to_string(), "name: required field is missing");
}

#[test]
fn empty_string_counts_as_missing() {
    let schema = channel_schema();
    let err = schema.validate(&object(json!({"name": "", "email": ["x"]}))).unwrap_err();
    assert_eq!(err.to_string(), "name: required field is missing");
}

#[test]
fn exactly_one_of_rejects_none_and_many() {
    let schema = channel_schema();
    let none = schema.validate(&object(json!({"name": "ops"}))).unwrap_err();
    assert_eq!(none.to_string(), "one of `email, webhook` must be specified");

    let many = schema
        .validate(&object(json!({"name": "ops", "email": ["a"], "webhook": ["http://x"]})))
        .unwrap_err();
    assert_eq!(
        many.to_string(),
        "only one of `email, webhook` can be specified, but `email, webhook` were specified"
    );
}

#[test]
fn item_limits_are_enforced() {
    let schema = channel_schema();
    let headers: Vec<Value> =
        (0 .. 21).map(|index| json!({"key": format!("k{index}"), "value": "v"})).collect();
    let err = schema
        .validate(&object(json!({"name": "ops", "email": ["a"], "headers": headers})))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "headers: attribute supports 20 item maximum, but config has 21 declared"
    );

    let twenty: Vec<Value> =
        (0 .. 20).map(|index| json!({"key": format!("k{index}"), "value": "v"})).collect();
    schema.validate(&object(json!({"name": "ops", "email": ["a"], "headers": twenty}))).unwrap();
}

#[test]
fn nested_block_errors_carry_their_path() {
    let schema = channel_schema();
    let err = schema
        .validate(&object(json!({"name": "ops", "email": ["a"], "headers": [{"key": "k"}]})))
        .unwrap_err();
    assert_eq!(err.to_string(), "headers.0.value: required field is missing");
}

#[test]
fn validators_report_every_violation() {
    let schema = channel_schema();
    let err = schema
        .validate(&object(json!({
            "name": "ops",
            "email": ["a"],
            "severity": "minor",
            "granularity": 1000,
            "widgets": "{not json",
            "tag_filter": "entity.type EQUALS",
        })))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("severity: expected one of [warning, critical], got minor"), "{message}");
    assert!(
        message.contains("granularity: expected one of [300000, 600000, 900000], got 1000"),
        "{message}"
    );
    assert!(message.contains("widgets: "), "{message}");
    assert!(message.contains("tag_filter: "), "{message}");
    assert_eq!(message.matches("; ").count(), 3, "{message}");
}

#[test]
fn type_mismatch_is_reported() {
    let schema = channel_schema();
    let err = schema.validate(&object(json!({"name": 5, "email": ["a"]}))).unwrap_err();
    assert_eq!(err.to_string(), "name: expected type string");
}

#[test]
fn conflicting_fields_are_rejected() {
    let schema = channel_schema();
    let err = schema
        .validate(&object(json!({"name": "ops", "email": ["a"], "query": "q", "entity_id": "e"})))
        .unwrap_err();
    assert_eq!(err.to_string(), "query: conflicts with entity_id");
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

#[test]
fn normalize_fills_defaults_and_drops_unknown_keys() {
    let schema = channel_schema();
    let normalized = schema.normalize(&object(json!({"name": "ops", "stale": true})));
    assert_eq!(normalized.get("granularity"), Some(&json!(600_000)));
    assert_eq!(normalized.get("email"), Some(&json!([])));
    assert_eq!(normalized.get("headers"), Some(&json!([])));
    assert_eq!(normalized.get("remote_id"), Some(&Value::Null));
    assert!(!normalized.contains_key("stale"));
    assert_eq!(normalized.len(), schema.len());
}

#[test]
fn normalize_sorts_sets_and_keeps_list_order() {
    let schema = channel_schema();
    let normalized = schema.normalize(&object(json!({
        "name": "ops",
        "email": ["c@x", "a@x", "b@x", "a@x"],
        "headers": [{"key": "z", "value": "1"}, {"key": "a", "value": "2"}],
    })));
    assert_eq!(normalized.get("email"), Some(&json!(["a@x", "b@x", "c@x"])));
    assert_eq!(
        normalized.get("headers"),
        Some(&json!([{"key": "z", "value": "1"}, {"key": "a", "value": "2"}]))
    );
}

#[test]
fn normalize_applies_state_functions_and_is_idempotent() {
    let schema = channel_schema();
    let once = schema.normalize(&object(json!({
        "name": "ops",
        "widgets": "{ \"b\": 1, \"a\": [true] }",
        "tag_filter": "(entity.type EQUALS 'host')",
    })));
    assert_eq!(once.get("widgets"), Some(&json!("{\"a\":[true],\"b\":1}")));
    assert_eq!(once.get("tag_filter"), Some(&json!("entity.type EQUALS 'host'")));
    assert_eq!(schema.normalize(&once), once);
}

// ============================================================================
// SECTION: Diff
// ============================================================================

#[test]
fn diff_ignores_computed_fields_and_equivalent_values() {
    let schema = channel_schema();
    let stored = object(json!({
        "name": "ops",
        "email": ["b", "a"],
        "tag_filter": "entity.type EQUALS 'host'",
        "remote_id": "r-1",
    }));
    let config = object(json!({
        "name": "ops",
        "email": ["a", "b"],
        "tag_filter": "(entity.type EQUALS 'host')",
    }));
    assert!(schema.diff(&stored, &config).is_empty());
}

#[test]
fn diff_lists_changed_fields() {
    let schema = channel_schema();
    let stored = object(json!({"name": "ops", "email": ["a"]}));
    let config = object(json!({"name": "dev", "email": ["a"], "granularity": 300_000}));
    assert_eq!(schema.diff(&stored, &config), vec!["granularity", "name"]);
}

#[test]
fn json_suppressor_compares_canonical_forms() {
    assert!(suppress_equivalent_json(&json!("{\"a\":1,\"b\":2}"), &json!("{ \"b\": 2, \"a\": 1 }")));
    assert!(!suppress_equivalent_json(&json!("{\"a\":1}"), &json!("{\"a\":2}")));
    assert!(!suppress_equivalent_json(&json!("{\"a\":1}"), &json!(null)));
}
