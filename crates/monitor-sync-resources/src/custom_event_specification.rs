// crates/monitor-sync-resources/src/custom_event_specification.rs
// ============================================================================
// Module: Custom Event Specification
// Description: User-defined events raised by threshold, system, or entity rules.
// Purpose: Map the rule-type discriminated rule onto sibling blocks.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde
// ============================================================================

//! ## Overview
//! A specification carries exactly one rule. The wire rule is tagged by
//! `ruleType` and holds an integer severity; state keeps the rule inside a
//! single `rule` block whose siblings are `entity_verification`, `system`,
//! and `threshold`. A threshold rule selects its metric either by name or by
//! pattern, never both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_core::BlockView;
use monitor_sync_core::Field;
use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::ResourceMetadata;
use monitor_sync_core::ResourceState;
use monitor_sync_core::Schema;
use monitor_sync_core::StateUpgrader;
use monitor_sync_core::SyncError;
use monitor_sync_core::Validator;
use monitor_sync_core::VariantAxis;
use monitor_sync_core::core::state::empty_list;
use monitor_sync_core::core::state::single_block;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::shared::DESCRIPTION;
use crate::shared::ENABLED;
use crate::shared::METRIC_NAME;
use crate::shared::RULE;
use crate::shared::SEVERITY;
use crate::shared::TRIGGERING;
use crate::shared::name_fields;
use crate::shared::name_from_state;
use crate::shared::names_to_state;
use crate::shared::put;
use crate::shared::severity_field;
use crate::shared::severity_from_state;
use crate::shared::severity_to_state;
use crate::shared::variant_container;
use crate::shared::variant_container_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "custom_event_specification";
/// Collection path.
pub const PATH: &str = "/api/events/settings/event-specifications/custom";
/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Entity type field.
pub const ENTITY_TYPE: &str = "entity_type";
/// Dynamic focus query field.
pub const QUERY: &str = "query";
/// Expiration time field.
pub const EXPIRATION_TIME: &str = "expiration_time";
/// Metric pattern block.
pub const METRIC_PATTERN: &str = "metric_pattern";
/// Condition operator field.
pub const CONDITION_OPERATOR: &str = "condition_operator";

/// Rule type discriminator table.
pub const RULE_AXIS: VariantAxis = VariantAxis {
    label: "rule",
    variants: &[
        ("entity_verification", "entity_verification"),
        ("system", "system"),
        ("threshold", "threshold"),
    ],
};

/// Accepted threshold aggregations.
pub const AGGREGATIONS: &[&str] = &["sum", "avg", "min", "max"];
/// Accepted condition operators; `=` is stored as `==`.
pub const CONDITION_OPERATORS: &[&str] = &["==", "=", "!=", "<", "<=", ">", ">="];
/// Accepted metric pattern operators.
pub const METRIC_PATTERN_OPERATORS: &[&str] = &["is", "contains", "any", "startsWith", "endsWith"];

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote custom event specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEventSpecification {
    /// Specification ID.
    #[serde(default)]
    pub id: String,
    /// Full name.
    pub name: String,
    /// Entity type the rule applies to.
    pub entity_type: String,
    /// Dynamic focus query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Whether the event opens an incident.
    #[serde(default)]
    pub triggering: bool,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grace period before the event closes, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
    /// Whether the specification is active.
    #[serde(default)]
    pub enabled: bool,
    /// Rules; exactly one is supported.
    pub rules: Vec<Rule>,
}

impl RestObject for CustomEventSpecification {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Metric selector by pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPattern {
    /// Metric name prefix.
    pub prefix: String,
    /// Metric name postfix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postfix: Option<String>,
    /// Placeholder matched by the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Placeholder operator.
    pub operator: String,
}

/// Rule of a custom event specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ruleType")]
pub enum Rule {
    /// Raised when a matching entity goes offline.
    #[serde(rename = "entity_verification", rename_all = "camelCase")]
    EntityVerification {
        /// Wire severity.
        severity: i64,
        /// Entity type to verify.
        matching_entity_type: String,
        /// Label operator.
        matching_operator: String,
        /// Entity label.
        matching_entity_label: String,
        /// Offline duration in milliseconds.
        offline_duration: i64,
    },
    /// Raised by a built-in system rule.
    #[serde(rename = "system", rename_all = "camelCase")]
    System {
        /// Wire severity.
        severity: i64,
        /// System rule ID.
        system_rule_id: String,
    },
    /// Raised when a metric crosses a threshold.
    #[serde(rename = "threshold", rename_all = "camelCase")]
    Threshold {
        /// Wire severity.
        severity: i64,
        /// Exact metric name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metric_name: Option<String>,
        /// Metric pattern.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metric_pattern: Option<MetricPattern>,
        /// Rollup in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rollup: Option<i64>,
        /// Window in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<i64>,
        /// Aggregation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aggregation: Option<String>,
        /// Condition operator.
        condition_operator: String,
        /// Condition value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition_value: Option<f64>,
    },
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Returns `==` for `=`, otherwise the operator itself.
fn canonical_operator(operator: &str) -> &str {
    if operator == "=" { "==" } else { operator }
}

/// Stores `=` as the canonical `==`.
fn canonical_condition_operator(value: &Value) -> Value {
    match value.as_str() {
        Some(operator) => Value::String(canonical_operator(operator).to_string()),
        None => value.clone(),
    }
}

/// Treats `=` and `==` as the same operator.
fn suppress_equal_operator(old: &Value, new: &Value) -> bool {
    canonical_condition_operator(old) == canonical_condition_operator(new)
}

/// Persisted fields of a custom event specification.
#[must_use]
pub fn schema() -> Schema {
    let metric_selector = [METRIC_NAME, METRIC_PATTERN];
    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.extend([
        (ENTITY_TYPE, Field::string().required()),
        (QUERY, Field::string()),
        (TRIGGERING, Field::bool().default_value(false)),
        (DESCRIPTION, Field::string()),
        (EXPIRATION_TIME, Field::int()),
        (ENABLED, Field::bool().default_value(true)),
        (
            RULE,
            variant_container(&RULE_AXIS, vec![
                (
                    "entity_verification",
                    Schema::new([
                        (SEVERITY, severity_field()),
                        ("matching_entity_type", Field::string().required()),
                        ("matching_operator", Field::string().required()),
                        ("matching_entity_label", Field::string().required()),
                        ("offline_duration", Field::int().required()),
                    ]),
                ),
                (
                    "system",
                    Schema::new([
                        (SEVERITY, severity_field()),
                        ("system_rule_id", Field::string().required()),
                    ]),
                ),
                (
                    "threshold",
                    Schema::new([
                        (SEVERITY, severity_field()),
                        (METRIC_NAME, Field::string().exactly_one_of(&metric_selector)),
                        (
                            METRIC_PATTERN,
                            Field::block_list(Schema::new([
                                ("prefix", Field::string().required()),
                                ("postfix", Field::string()),
                                ("placeholder", Field::string()),
                                (
                                    "operator",
                                    Field::string()
                                        .required()
                                        .validate(Validator::OneOf(METRIC_PATTERN_OPERATORS)),
                                ),
                            ]))
                            .max_items(1)
                            .exactly_one_of(&metric_selector),
                        ),
                        ("rollup", Field::int()),
                        ("window", Field::int()),
                        ("aggregation", Field::string().validate(Validator::OneOf(AGGREGATIONS))),
                        (
                            CONDITION_OPERATOR,
                            Field::string()
                                .required()
                                .validate(Validator::OneOf(CONDITION_OPERATORS))
                                .state_func(canonical_condition_operator)
                                .diff_suppress(suppress_equal_operator),
                        ),
                        ("condition_value", Field::float()),
                    ]),
                ),
            ]),
        ),
    ]);
    Schema::new(fields)
}

/// Version 0 carried `downstream_integration_ids`, which the remote no longer
/// accepts.
fn drop_downstream_integrations(
    mut raw: Map<String, Value>,
) -> Result<Map<String, Value>, String> {
    raw.remove("downstream_integration_ids");
    Ok(raw)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for custom event specifications.
#[derive(Debug, Clone)]
pub struct CustomEventSpecificationHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl CustomEventSpecificationHandle {
    /// Creates the handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetadata {
                name: RESOURCE_NAME,
                schema: schema(),
                schema_version: SCHEMA_VERSION,
                id_field: None,
                skip_id_generation: false,
            },
        }
    }
}

impl Default for CustomEventSpecificationHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a wire rule into the chosen block name and content.
fn rule_to_block(rule: &Rule) -> Result<(&'static str, Map<String, Value>), SyncError> {
    let mut inner = Map::new();
    let block = match rule {
        Rule::EntityVerification {
            severity,
            matching_entity_type,
            matching_operator,
            matching_entity_label,
            offline_duration,
        } => {
            put(&mut inner, SEVERITY, severity_to_state(*severity)?);
            put(&mut inner, "matching_entity_type", matching_entity_type.as_str());
            put(&mut inner, "matching_operator", matching_operator.as_str());
            put(&mut inner, "matching_entity_label", matching_entity_label.as_str());
            put(&mut inner, "offline_duration", *offline_duration);
            "entity_verification"
        }
        Rule::System {
            severity,
            system_rule_id,
        } => {
            put(&mut inner, SEVERITY, severity_to_state(*severity)?);
            put(&mut inner, "system_rule_id", system_rule_id.as_str());
            "system"
        }
        Rule::Threshold {
            severity,
            metric_name,
            metric_pattern,
            rollup,
            window,
            aggregation,
            condition_operator,
            condition_value,
        } => {
            put(&mut inner, SEVERITY, severity_to_state(*severity)?);
            put(&mut inner, METRIC_NAME, metric_name.clone());
            let pattern = metric_pattern.as_ref().map_or_else(empty_list, |pattern| {
                let mut block = Map::new();
                put(&mut block, "prefix", pattern.prefix.as_str());
                put(&mut block, "postfix", pattern.postfix.clone());
                put(&mut block, "placeholder", pattern.placeholder.clone());
                put(&mut block, "operator", pattern.operator.as_str());
                single_block(block)
            });
            put(&mut inner, METRIC_PATTERN, pattern);
            put(&mut inner, "rollup", *rollup);
            put(&mut inner, "window", *window);
            put(&mut inner, "aggregation", aggregation.clone());
            put(&mut inner, CONDITION_OPERATOR, canonical_operator(condition_operator));
            put(&mut inner, "condition_value", *condition_value);
            "threshold"
        }
    };
    Ok((block, inner))
}

/// Reads the metric selector of a threshold rule.
fn metric_selector(
    fields: &BlockView<'_>,
) -> Result<(Option<String>, Option<MetricPattern>), SyncError> {
    let name = fields.string(METRIC_NAME);
    let pattern = fields.block(METRIC_PATTERN).map(|pattern| MetricPattern {
        prefix: pattern.string_or_empty("prefix"),
        postfix: pattern.string("postfix"),
        placeholder: pattern.string("placeholder"),
        operator: pattern.string_or_empty("operator"),
    });
    match (&name, &pattern) {
        (Some(_), Some(_)) => {
            Err(SyncError::validation("metric_name and metric_pattern cannot both be set"))
        }
        (None, None) => Err(SyncError::validation("either metric_name or metric_pattern must be set")),
        _ => Ok((name, pattern)),
    }
}

/// Reads the selected rule block into a wire rule.
fn block_to_rule(block: &str, fields: &BlockView<'_>) -> Result<Rule, SyncError> {
    let severity = severity_from_state(fields)?;
    match block {
        "entity_verification" => Ok(Rule::EntityVerification {
            severity,
            matching_entity_type: fields.string_or_empty("matching_entity_type"),
            matching_operator: fields.string_or_empty("matching_operator"),
            matching_entity_label: fields.string_or_empty("matching_entity_label"),
            offline_duration: fields.int("offline_duration").unwrap_or_default(),
        }),
        "system" => Ok(Rule::System {
            severity,
            system_rule_id: fields.string_or_empty("system_rule_id"),
        }),
        _ => {
            let (metric_name, metric_pattern) = metric_selector(fields)?;
            let operator = fields.string_or_empty(CONDITION_OPERATOR);
            Ok(Rule::Threshold {
                severity,
                metric_name,
                metric_pattern,
                rollup: fields.int("rollup"),
                window: fields.int("window"),
                aggregation: fields.string("aggregation"),
                condition_operator: canonical_operator(&operator).to_string(),
                condition_value: fields.float("condition_value"),
            })
        }
    }
}

impl ResourceHandle for CustomEventSpecificationHandle {
    type Model = CustomEventSpecification;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn state_upgraders(&self) -> Vec<StateUpgrader> {
        vec![StateUpgrader {
            version: 0,
            upgrade: drop_downstream_integrations,
        }]
    }

    fn rest_resource<'a>(
        &self,
        client: &'a RestClient,
    ) -> RestResource<'a, CustomEventSpecification> {
        RestResource::new(client, PATH, RestMode::PutCreatePutUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &CustomEventSpecification,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        let rule = match model.rules.as_slice() {
            [rule] => rule,
            [] => return Err(SyncError::validation("no supported rule defined")),
            _ => return Err(SyncError::validation("more than one rule defined")),
        };
        let (block, inner) = rule_to_block(rule)?;
        names_to_state(state, formatter, &model.name);
        state.set(ENTITY_TYPE, model.entity_type.as_str());
        state.set(QUERY, model.query.clone());
        state.set(TRIGGERING, model.triggering);
        state.set(DESCRIPTION, model.description.clone());
        state.set(EXPIRATION_TIME, model.expiration_time);
        state.set(ENABLED, model.enabled);
        state.set(RULE, variant_container_value(&RULE_AXIS, block, inner)?);
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<CustomEventSpecification, SyncError> {
        let container =
            state.block(RULE).ok_or_else(|| SyncError::validation("no supported rule defined"))?;
        let (block, fields) = RULE_AXIS.select(&container)?;
        let rule = block_to_rule(block, &fields)?;
        Ok(CustomEventSpecification {
            id: state.id().to_string(),
            name: name_from_state(state, formatter),
            entity_type: state.string_or_empty(ENTITY_TYPE),
            query: state.string(QUERY),
            triggering: state.flag(TRIGGERING),
            description: state.string(DESCRIPTION),
            expiration_time: state.int(EXPIRATION_TIME),
            enabled: state.bool(ENABLED).unwrap_or(true),
            rules: vec![rule],
        })
    }
}
