// crates/monitor-sync-resources/src/website_alert_config.rs
// ============================================================================
// Module: Website Alert Config
// Description: Smart alerts evaluated on website beacon metrics.
// Purpose: Map three variant axes plus tag filter and payload fields.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde, tag-filter
// ============================================================================

//! ## Overview
//! A website alert combines a rule (`alertType`), a threshold (`type`), and a
//! time threshold (`type`). Each axis lives in its own single-element state
//! block with one sibling per variant. The scope filter is stored as the
//! normalized tag-filter expression and sent as the typed filter tree.

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
use monitor_sync_core::SyncError;
use monitor_sync_core::Validator;
use monitor_sync_core::VariantAxis;
use monitor_sync_core::core::state::string_list;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tag_filter::TagFilter;

use crate::shared::AGGREGATION;
use crate::shared::ALERT_CHANNEL_IDS;
use crate::shared::CUSTOM_PAYLOAD_FIELD;
use crate::shared::CustomPayloadField;
use crate::shared::DEFAULT_GRANULARITY;
use crate::shared::DESCRIPTION;
use crate::shared::GRANULARITY;
use crate::shared::METRIC_NAME;
use crate::shared::OPERATOR;
use crate::shared::RULE;
use crate::shared::SEVERITY;
use crate::shared::TAG_FILTER;
use crate::shared::THRESHOLD;
use crate::shared::TIME_THRESHOLD;
use crate::shared::TIME_WINDOW;
use crate::shared::TRIGGERING;
use crate::shared::Threshold;
use crate::shared::VALUE;
use crate::shared::VIOLATIONS;
use crate::shared::alert_channel_ids_field;
use crate::shared::container_block;
use crate::shared::custom_payload_field;
use crate::shared::custom_payload_fields_from_state;
use crate::shared::custom_payload_fields_to_state;
use crate::shared::granularity_field;
use crate::shared::name_fields;
use crate::shared::name_from_state;
use crate::shared::names_to_state;
use crate::shared::put;
use crate::shared::severity_field;
use crate::shared::severity_from_state;
use crate::shared::severity_to_state;
use crate::shared::tag_filter_field;
use crate::shared::tag_filter_from_wire;
use crate::shared::tag_filter_to_wire;
use crate::shared::threshold_field;
use crate::shared::threshold_from_state;
use crate::shared::threshold_to_state;
use crate::shared::variant_container;
use crate::shared::variant_container_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "website_alert_config";
/// Collection path.
pub const PATH: &str = "/api/events/settings/website-alert-configs";
/// Monitored website.
pub const WEBSITE_ID: &str = "website_id";

/// Rule discriminator table.
pub const RULE_AXIS: VariantAxis = VariantAxis {
    label: "website alert rule",
    variants: &[
        ("slowness", "slowness"),
        ("specificJsError", "specific_js_error"),
        ("statusCode", "status_code"),
        ("throughput", "throughput"),
    ],
};

/// Time threshold discriminator table.
pub const TIME_THRESHOLD_AXIS: VariantAxis = VariantAxis {
    label: "website time threshold",
    variants: &[
        ("userImpactOfViolationsInSequence", "user_impact_of_violations_in_sequence"),
        ("violationsInPeriod", "violations_in_period"),
        ("violationsInSequence", "violations_in_sequence"),
    ],
};

/// Beacon metric aggregations.
pub const AGGREGATIONS: &[&str] = &[
    "SUM", "MEAN", "MAX", "MIN", "P25", "P50", "P75", "P90", "P95", "P98", "P99", "DISTINCT_COUNT",
];
/// String comparison operators of JS error and status code rules.
pub const RULE_OPERATORS: &[&str] = &[
    "EQUALS",
    "NOT_EQUAL",
    "CONTAINS",
    "NOT_CONTAIN",
    "IS_EMPTY",
    "NOT_EMPTY",
    "IS_BLANK",
    "NOT_BLANK",
    "STARTS_WITH",
    "ENDS_WITH",
    "NOT_STARTS_WITH",
    "NOT_ENDS_WITH",
];
/// How user impact is measured.
pub const IMPACT_MEASUREMENT_METHODS: &[&str] = &["AGGREGATED", "PER_WINDOW"];

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote website alert config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteAlertConfig {
    /// Config ID.
    #[serde(default)]
    pub id: String,
    /// Full name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Monitored website.
    pub website_id: String,
    /// Wire severity.
    pub severity: i64,
    /// Whether an incident is opened.
    #[serde(default)]
    pub triggering: bool,
    /// Scope filter.
    pub tag_filter_expression: TagFilter,
    /// Notified channels.
    #[serde(default)]
    pub alert_channel_ids: Vec<String>,
    /// Evaluation granularity.
    pub granularity: i64,
    /// Rule.
    pub rule: WebsiteAlertRule,
    /// Threshold.
    pub threshold: Threshold,
    /// Time threshold.
    pub time_threshold: WebsiteTimeThreshold,
    /// Extra notification payload.
    #[serde(default)]
    pub custom_payload_fields: Vec<CustomPayloadField>,
}

impl RestObject for WebsiteAlertConfig {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Metric and aggregation of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetric {
    /// Beacon metric.
    pub metric_name: String,
    /// Aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
}

/// Metric plus string comparison of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleComparison {
    /// Beacon metric.
    pub metric_name: String,
    /// Aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    /// Comparison operator.
    pub operator: String,
    /// Compared value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Rule of a website alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "alertType")]
pub enum WebsiteAlertRule {
    /// Page load or resource slowness.
    #[serde(rename = "slowness")]
    Slowness(RuleMetric),
    /// A specific JavaScript error.
    #[serde(rename = "specificJsError")]
    SpecificJsError(RuleComparison),
    /// HTTP status codes.
    #[serde(rename = "statusCode")]
    StatusCode(RuleComparison),
    /// Beacon throughput.
    #[serde(rename = "throughput")]
    Throughput(RuleMetric),
}

/// Time threshold of a website alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebsiteTimeThreshold {
    /// Violations in sequence affecting a share of users.
    #[serde(rename = "userImpactOfViolationsInSequence", rename_all = "camelCase")]
    UserImpactOfViolationsInSequence {
        /// Window in milliseconds.
        time_window: i64,
        /// `AGGREGATED` or `PER_WINDOW`.
        impact_measurement_method: String,
        /// Share of affected users, 0 to 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_percentage: Option<f64>,
        /// Number of affected users.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        users: Option<i64>,
    },
    /// Number of violations within the window.
    #[serde(rename = "violationsInPeriod", rename_all = "camelCase")]
    ViolationsInPeriod {
        /// Window in milliseconds.
        time_window: i64,
        /// Violations required.
        violations: i64,
    },
    /// Continuous violation for the window.
    #[serde(rename = "violationsInSequence", rename_all = "camelCase")]
    ViolationsInSequence {
        /// Window in milliseconds.
        time_window: i64,
    },
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Rule block with metric and aggregation.
fn metric_block() -> Schema {
    Schema::new([
        (METRIC_NAME, Field::string().required()),
        (AGGREGATION, Field::string().validate(Validator::OneOf(AGGREGATIONS))),
    ])
}

/// Rule block with metric, aggregation, and comparison.
fn comparison_block() -> Schema {
    Schema::new([
        (METRIC_NAME, Field::string().required()),
        (AGGREGATION, Field::string().validate(Validator::OneOf(AGGREGATIONS))),
        (OPERATOR, Field::string().required().validate(Validator::OneOf(RULE_OPERATORS))),
        (VALUE, Field::string()),
    ])
}

/// Persisted fields of a website alert config.
#[must_use]
pub fn schema() -> Schema {
    let time_window = || Field::int().required();
    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.extend([
        (DESCRIPTION, Field::string().required()),
        (WEBSITE_ID, Field::string().required()),
        (SEVERITY, severity_field()),
        (TRIGGERING, Field::bool().default_value(false)),
        (TAG_FILTER, tag_filter_field()),
        (ALERT_CHANNEL_IDS, alert_channel_ids_field()),
        (GRANULARITY, granularity_field()),
        (CUSTOM_PAYLOAD_FIELD, custom_payload_field()),
        (
            RULE,
            variant_container(&RULE_AXIS, vec![
                ("slowness", metric_block()),
                ("specific_js_error", comparison_block()),
                ("status_code", comparison_block()),
                ("throughput", metric_block()),
            ]),
        ),
        (THRESHOLD, threshold_field()),
        (
            TIME_THRESHOLD,
            variant_container(&TIME_THRESHOLD_AXIS, vec![
                (
                    "user_impact_of_violations_in_sequence",
                    Schema::new([
                        (TIME_WINDOW, time_window()),
                        (
                            "impact_measurement_method",
                            Field::string()
                                .required()
                                .validate(Validator::OneOf(IMPACT_MEASUREMENT_METHODS)),
                        ),
                        (
                            "user_percentage",
                            Field::float().validate(Validator::FloatRange { min: 0.0, max: 1.0 }),
                        ),
                        ("users", Field::int().validate(Validator::IntRange { min: 1, max: i64::MAX })),
                    ]),
                ),
                (
                    "violations_in_period",
                    Schema::new([
                        (TIME_WINDOW, time_window()),
                        (VIOLATIONS, Field::int().required().validate(Validator::IntRange { min: 1, max: 12 })),
                    ]),
                ),
                ("violations_in_sequence", Schema::new([(TIME_WINDOW, time_window())])),
            ]),
        ),
    ]);
    Schema::new(fields)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for website alert configs.
#[derive(Debug, Clone)]
pub struct WebsiteAlertConfigHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl WebsiteAlertConfigHandle {
    /// Creates the handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetadata {
                name: RESOURCE_NAME,
                schema: schema(),
                schema_version: 0,
                id_field: None,
                skip_id_generation: true,
            },
        }
    }
}

impl Default for WebsiteAlertConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the comparison part of a rule.
fn put_comparison(inner: &mut Map<String, Value>, comparison: &RuleComparison) {
    put(inner, OPERATOR, comparison.operator.as_str());
    put(inner, VALUE, comparison.value.clone());
}

/// Converts the rule into its container value.
fn rule_to_state(rule: &WebsiteAlertRule) -> Result<Value, SyncError> {
    let mut inner = Map::new();
    let (block, metric_name, aggregation) = match rule {
        WebsiteAlertRule::Slowness(metric) => ("slowness", &metric.metric_name, &metric.aggregation),
        WebsiteAlertRule::Throughput(metric) => ("throughput", &metric.metric_name, &metric.aggregation),
        WebsiteAlertRule::SpecificJsError(comparison) => {
            put_comparison(&mut inner, comparison);
            ("specific_js_error", &comparison.metric_name, &comparison.aggregation)
        }
        WebsiteAlertRule::StatusCode(comparison) => {
            put_comparison(&mut inner, comparison);
            ("status_code", &comparison.metric_name, &comparison.aggregation)
        }
    };
    put(&mut inner, METRIC_NAME, metric_name.as_str());
    put(&mut inner, AGGREGATION, aggregation.clone());
    variant_container_value(&RULE_AXIS, block, inner)
}

/// Reads the selected rule block.
fn rule_from_block(block: &str, fields: &BlockView<'_>) -> WebsiteAlertRule {
    let metric = || RuleMetric {
        metric_name: fields.string_or_empty(METRIC_NAME),
        aggregation: fields.string(AGGREGATION),
    };
    let comparison = || RuleComparison {
        metric_name: fields.string_or_empty(METRIC_NAME),
        aggregation: fields.string(AGGREGATION),
        operator: fields.string_or_empty(OPERATOR),
        value: fields.string(VALUE),
    };
    match block {
        "slowness" => WebsiteAlertRule::Slowness(metric()),
        "specific_js_error" => WebsiteAlertRule::SpecificJsError(comparison()),
        "status_code" => WebsiteAlertRule::StatusCode(comparison()),
        _ => WebsiteAlertRule::Throughput(metric()),
    }
}

/// Converts the time threshold into its container value.
fn time_threshold_to_state(threshold: &WebsiteTimeThreshold) -> Result<Value, SyncError> {
    let mut inner = Map::new();
    let block = match threshold {
        WebsiteTimeThreshold::UserImpactOfViolationsInSequence {
            time_window,
            impact_measurement_method,
            user_percentage,
            users,
        } => {
            put(&mut inner, TIME_WINDOW, *time_window);
            put(&mut inner, "impact_measurement_method", impact_measurement_method.as_str());
            put(&mut inner, "user_percentage", *user_percentage);
            put(&mut inner, "users", *users);
            "user_impact_of_violations_in_sequence"
        }
        WebsiteTimeThreshold::ViolationsInPeriod {
            time_window,
            violations,
        } => {
            put(&mut inner, TIME_WINDOW, *time_window);
            put(&mut inner, VIOLATIONS, *violations);
            "violations_in_period"
        }
        WebsiteTimeThreshold::ViolationsInSequence {
            time_window,
        } => {
            put(&mut inner, TIME_WINDOW, *time_window);
            "violations_in_sequence"
        }
    };
    variant_container_value(&TIME_THRESHOLD_AXIS, block, inner)
}

/// Reads the selected time threshold block.
fn time_threshold_from_block(block: &str, fields: &BlockView<'_>) -> WebsiteTimeThreshold {
    let time_window = fields.int(TIME_WINDOW).unwrap_or_default();
    match block {
        "user_impact_of_violations_in_sequence" => {
            WebsiteTimeThreshold::UserImpactOfViolationsInSequence {
                time_window,
                impact_measurement_method: fields.string_or_empty("impact_measurement_method"),
                user_percentage: fields.float("user_percentage"),
                users: fields.int("users"),
            }
        }
        "violations_in_period" => WebsiteTimeThreshold::ViolationsInPeriod {
            time_window,
            violations: fields.int(VIOLATIONS).unwrap_or_default(),
        },
        _ => WebsiteTimeThreshold::ViolationsInSequence {
            time_window,
        },
    }
}

impl ResourceHandle for WebsiteAlertConfigHandle {
    type Model = WebsiteAlertConfig;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, WebsiteAlertConfig> {
        RestResource::new(client, PATH, RestMode::PostCreatePostUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &WebsiteAlertConfig,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        let severity = severity_to_state(model.severity)?;
        let tag_filter = tag_filter_from_wire(Some(&model.tag_filter_expression))?;
        let payload = custom_payload_fields_to_state(&model.custom_payload_fields)?;
        let rule = rule_to_state(&model.rule)?;
        let threshold = threshold_to_state(&model.threshold)?;
        let time_threshold = time_threshold_to_state(&model.time_threshold)?;

        names_to_state(state, formatter, &model.name);
        state.set(DESCRIPTION, model.description.as_str());
        state.set(WEBSITE_ID, model.website_id.as_str());
        state.set(SEVERITY, severity);
        state.set(TRIGGERING, model.triggering);
        state.set(TAG_FILTER, tag_filter);
        state.set(ALERT_CHANNEL_IDS, string_list(&model.alert_channel_ids));
        state.set(GRANULARITY, model.granularity);
        state.set(CUSTOM_PAYLOAD_FIELD, payload);
        state.set(RULE, rule);
        state.set(THRESHOLD, threshold);
        state.set(TIME_THRESHOLD, time_threshold);
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<WebsiteAlertConfig, SyncError> {
        let rule = container_block(state, RULE, &RULE_AXIS)?;
        let (rule_block, rule_fields) = RULE_AXIS.select(&rule)?;
        let time_threshold = container_block(state, TIME_THRESHOLD, &TIME_THRESHOLD_AXIS)?;
        let (time_block, time_fields) = TIME_THRESHOLD_AXIS.select(&time_threshold)?;
        Ok(WebsiteAlertConfig {
            id: state.id().to_string(),
            name: name_from_state(state, formatter),
            description: state.string_or_empty(DESCRIPTION),
            website_id: state.string_or_empty(WEBSITE_ID),
            severity: severity_from_state(state)?,
            triggering: state.flag(TRIGGERING),
            tag_filter_expression: tag_filter_to_wire(state.string(TAG_FILTER).as_deref())?,
            alert_channel_ids: state.strings(ALERT_CHANNEL_IDS),
            granularity: state.int(GRANULARITY).unwrap_or(DEFAULT_GRANULARITY),
            rule: rule_from_block(rule_block, &rule_fields),
            threshold: threshold_from_state(state)?,
            time_threshold: time_threshold_from_block(time_block, &time_fields),
            custom_payload_fields: custom_payload_fields_from_state(state)?,
        })
    }
}
