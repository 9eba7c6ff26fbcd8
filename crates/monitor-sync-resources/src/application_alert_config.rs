// crates/monitor-sync-resources/src/application_alert_config.rs
// ============================================================================
// Module: Application Alert Config
// Description: Smart alerts evaluated on application, service, or endpoint calls.
// Purpose: Map application scopes, rules, and thresholds for local and global configs.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde, tag-filter
// ============================================================================

//! ## Overview
//! Application alerts scope themselves through nested inclusion records: an
//! application holds services, a service holds endpoints, each with an
//! `inclusive` flag. The wire keys these records by ID in JSON objects; state
//! keeps them as nested block sets. The same handle serves the per-application
//! collection and the global collection under a second resource name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

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
use monitor_sync_core::core::state::block_list;
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

/// Resource name of per-application configs.
pub const RESOURCE_NAME: &str = "application_alert_config";
/// Collection path of per-application configs.
pub const PATH: &str = "/api/events/settings/application-alert-configs";
/// Resource name of global configs.
pub const GLOBAL_RESOURCE_NAME: &str = "global_application_alert_config";
/// Collection path of global configs.
pub const GLOBAL_PATH: &str = "/api/events/settings/global-alert-configs/applications";

/// Application scope set.
pub const APPLICATION: &str = "application";
/// Service scope set inside an application.
pub const SERVICE: &str = "service";
/// Endpoint scope set inside a service.
pub const ENDPOINT: &str = "endpoint";
/// Inclusion flag of a scope.
pub const INCLUSIVE: &str = "inclusive";
/// Call boundary.
pub const BOUNDARY_SCOPE: &str = "boundary_scope";
/// Evaluation granularity of the scope.
pub const EVALUATION_TYPE: &str = "evaluation_type";
/// Include internal calls.
pub const INCLUDE_INTERNAL: &str = "include_internal";
/// Include synthetic calls.
pub const INCLUDE_SYNTHETIC: &str = "include_synthetic";

/// Supported call boundaries.
pub const BOUNDARY_SCOPES: &[&str] = &["ALL", "INBOUND", "DEFAULT"];
/// Supported evaluation types.
pub const EVALUATION_TYPES: &[&str] = &["PER_AP", "PER_AP_SERVICE", "PER_AP_ENDPOINT"];
/// Call metric aggregations.
pub const AGGREGATIONS: &[&str] =
    &["SUM", "MEAN", "MAX", "MIN", "P25", "P50", "P75", "P90", "P95", "P98", "P99"];
/// Log levels of a logs rule.
pub const LOG_LEVELS: &[&str] = &["WARN", "ERROR", "ANY"];
/// Message operators of a logs rule.
pub const LOG_OPERATORS: &[&str] = &[
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

/// Rule discriminator table.
pub const RULE_AXIS: VariantAxis = VariantAxis {
    label: "application alert rule",
    variants: &[
        ("errorRate", "error_rate"),
        ("errors", "errors"),
        ("logs", "logs"),
        ("slowness", "slowness"),
        ("statusCode", "status_code"),
        ("throughput", "throughput"),
    ],
};

/// Time threshold discriminator table.
pub const TIME_THRESHOLD_AXIS: VariantAxis = VariantAxis {
    label: "application time threshold",
    variants: &[
        ("requestImpact", "request_impact"),
        ("violationsInPeriod", "violations_in_period"),
        ("violationsInSequence", "violations_in_sequence"),
    ],
};

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote application alert config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationAlertConfig {
    /// Config ID.
    #[serde(default)]
    pub id: String,
    /// Full name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Scoped applications keyed by ID.
    #[serde(default)]
    pub applications: BTreeMap<String, IncludedApplication>,
    /// Call boundary.
    pub boundary_scope: String,
    /// Evaluation granularity of the scope.
    pub evaluation_type: String,
    /// Include internal calls.
    #[serde(default)]
    pub include_internal: bool,
    /// Include synthetic calls.
    #[serde(default)]
    pub include_synthetic: bool,
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
    pub rule: ApplicationAlertRule,
    /// Threshold.
    pub threshold: Threshold,
    /// Time threshold.
    pub time_threshold: ApplicationTimeThreshold,
    /// Extra notification payload.
    #[serde(default)]
    pub custom_payload_fields: Vec<CustomPayloadField>,
}

impl RestObject for ApplicationAlertConfig {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Application scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedApplication {
    /// Application ID.
    pub application_id: String,
    /// Whether the application itself is in scope.
    pub inclusive: bool,
    /// Services keyed by ID.
    #[serde(default)]
    pub services: BTreeMap<String, IncludedService>,
}

/// Service scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedService {
    /// Service ID.
    pub service_id: String,
    /// Whether the service itself is in scope.
    pub inclusive: bool,
    /// Endpoints keyed by ID.
    #[serde(default)]
    pub endpoints: BTreeMap<String, IncludedEndpoint>,
}

/// Endpoint scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedEndpoint {
    /// Endpoint ID.
    pub endpoint_id: String,
    /// Whether the endpoint is in scope.
    pub inclusive: bool,
}

/// Metric and aggregation of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetric {
    /// Call metric.
    pub metric_name: String,
    /// Aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
}

/// Logs rule settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsRule {
    /// Call metric.
    pub metric_name: String,
    /// Aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    /// Log level.
    pub level: String,
    /// Message compared with `operator`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Message operator.
    pub operator: String,
}

/// Status code rule settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCodeRule {
    /// Call metric.
    pub metric_name: String,
    /// Aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    /// First status code of the range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code_start: Option<i64>,
    /// Last status code of the range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code_end: Option<i64>,
}

/// Rule of an application alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "alertType")]
pub enum ApplicationAlertRule {
    /// Share of erroneous calls.
    #[serde(rename = "errorRate")]
    ErrorRate(CallMetric),
    /// Number of erroneous calls.
    #[serde(rename = "errors")]
    Errors(CallMetric),
    /// Log messages.
    #[serde(rename = "logs")]
    Logs(LogsRule),
    /// Call latency.
    #[serde(rename = "slowness")]
    Slowness(CallMetric),
    /// HTTP status codes.
    #[serde(rename = "statusCode")]
    StatusCode(StatusCodeRule),
    /// Call throughput.
    #[serde(rename = "throughput")]
    Throughput(CallMetric),
}

/// Time threshold of an application alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApplicationTimeThreshold {
    /// Violations affecting a number of requests.
    #[serde(rename = "requestImpact", rename_all = "camelCase")]
    RequestImpact {
        /// Window in milliseconds.
        time_window: i64,
        /// Affected requests.
        requests: i64,
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

/// Metric and aggregation fields shared by every rule block.
fn metric_fields() -> Vec<(&'static str, Field)> {
    vec![
        (METRIC_NAME, Field::string().required()),
        (AGGREGATION, Field::string().validate(Validator::OneOf(AGGREGATIONS))),
    ]
}

/// Nested application, service, and endpoint scope sets.
fn application_scope_field() -> Field {
    let endpoint = Schema::new([
        ("endpoint_id", Field::string().required()),
        (INCLUSIVE, Field::bool().required()),
    ]);
    let service = Schema::new([
        ("service_id", Field::string().required()),
        (INCLUSIVE, Field::bool().required()),
        (ENDPOINT, Field::block_set(endpoint)),
    ]);
    Field::block_set(Schema::new([
        ("application_id", Field::string().required()),
        (INCLUSIVE, Field::bool().required()),
        (SERVICE, Field::block_set(service)),
    ]))
    .required()
    .min_items(1)
    .describe("Applications, services, and endpoints in scope.")
}

/// Persisted fields of an application alert config.
#[must_use]
pub fn schema() -> Schema {
    let time_window = || Field::int().required();
    let mut logs = metric_fields();
    logs.extend([
        ("level", Field::string().required().validate(Validator::OneOf(LOG_LEVELS))),
        ("message", Field::string()),
        (OPERATOR, Field::string().required().validate(Validator::OneOf(LOG_OPERATORS))),
    ]);
    let mut status_code = metric_fields();
    status_code.extend([
        ("status_code_start", Field::int().validate(Validator::IntRange { min: 100, max: 599 })),
        ("status_code_end", Field::int().validate(Validator::IntRange { min: 100, max: 599 })),
    ]);

    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.extend([
        (DESCRIPTION, Field::string().required()),
        (APPLICATION, application_scope_field()),
        (BOUNDARY_SCOPE, Field::string().required().validate(Validator::OneOf(BOUNDARY_SCOPES))),
        (EVALUATION_TYPE, Field::string().required().validate(Validator::OneOf(EVALUATION_TYPES))),
        (INCLUDE_INTERNAL, Field::bool().default_value(false)),
        (INCLUDE_SYNTHETIC, Field::bool().default_value(false)),
        (SEVERITY, severity_field()),
        (TRIGGERING, Field::bool().default_value(false)),
        (TAG_FILTER, tag_filter_field()),
        (ALERT_CHANNEL_IDS, alert_channel_ids_field()),
        (GRANULARITY, granularity_field()),
        (CUSTOM_PAYLOAD_FIELD, custom_payload_field()),
        (
            RULE,
            variant_container(&RULE_AXIS, vec![
                ("error_rate", Schema::new(metric_fields())),
                ("errors", Schema::new(metric_fields())),
                ("logs", Schema::new(logs)),
                ("slowness", Schema::new(metric_fields())),
                ("status_code", Schema::new(status_code)),
                ("throughput", Schema::new(metric_fields())),
            ]),
        ),
        (THRESHOLD, threshold_field()),
        (
            TIME_THRESHOLD,
            variant_container(&TIME_THRESHOLD_AXIS, vec![
                (
                    "request_impact",
                    Schema::new([
                        (TIME_WINDOW, time_window()),
                        ("requests", Field::int().required().validate(Validator::IntRange {
                            min: 1,
                            max: i64::MAX,
                        })),
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

/// Handle for application alert configs.
#[derive(Debug, Clone)]
pub struct ApplicationAlertConfigHandle {
    /// Static description.
    metadata: ResourceMetadata,
    /// Collection path.
    path: &'static str,
}

impl ApplicationAlertConfigHandle {
    /// Creates the handle for per-application configs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_collection(RESOURCE_NAME, PATH)
    }

    /// Creates the handle for global configs.
    #[must_use]
    pub fn global() -> Self {
        Self::with_collection(GLOBAL_RESOURCE_NAME, GLOBAL_PATH)
    }

    /// Binds the handle to a resource name and collection.
    fn with_collection(name: &'static str, path: &'static str) -> Self {
        Self {
            metadata: ResourceMetadata {
                name,
                schema: schema(),
                schema_version: 0,
                id_field: None,
                skip_id_generation: true,
            },
            path,
        }
    }
}

impl Default for ApplicationAlertConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts the scope map into nested block sets.
fn applications_to_state(applications: &BTreeMap<String, IncludedApplication>) -> Value {
    block_list(applications.values().map(|application| {
        let services = block_list(application.services.values().map(|service| {
            let endpoints = block_list(service.endpoints.values().map(|endpoint| {
                let mut block = Map::new();
                put(&mut block, "endpoint_id", endpoint.endpoint_id.as_str());
                put(&mut block, INCLUSIVE, endpoint.inclusive);
                block
            }));
            let mut block = Map::new();
            put(&mut block, "service_id", service.service_id.as_str());
            put(&mut block, INCLUSIVE, service.inclusive);
            put(&mut block, ENDPOINT, endpoints);
            block
        }));
        let mut block = Map::new();
        put(&mut block, "application_id", application.application_id.as_str());
        put(&mut block, INCLUSIVE, application.inclusive);
        put(&mut block, SERVICE, services);
        block
    }))
}

/// Reads the nested scope sets into the keyed wire map.
fn applications_from_state(state: &ResourceState) -> BTreeMap<String, IncludedApplication> {
    state
        .blocks(APPLICATION)
        .iter()
        .map(|application| {
            let services = application
                .blocks(SERVICE)
                .iter()
                .map(|service| {
                    let endpoints = service
                        .blocks(ENDPOINT)
                        .iter()
                        .map(|endpoint| {
                            let endpoint_id = endpoint.string_or_empty("endpoint_id");
                            (endpoint_id.clone(), IncludedEndpoint {
                                endpoint_id,
                                inclusive: endpoint.flag(INCLUSIVE),
                            })
                        })
                        .collect();
                    let service_id = service.string_or_empty("service_id");
                    (service_id.clone(), IncludedService {
                        service_id,
                        inclusive: service.flag(INCLUSIVE),
                        endpoints,
                    })
                })
                .collect();
            let application_id = application.string_or_empty("application_id");
            (application_id.clone(), IncludedApplication {
                application_id,
                inclusive: application.flag(INCLUSIVE),
                services,
            })
        })
        .collect()
}

/// Converts the rule into its container value.
fn rule_to_state(rule: &ApplicationAlertRule) -> Result<Value, SyncError> {
    let mut inner = Map::new();
    let (block, metric_name, aggregation) = match rule {
        ApplicationAlertRule::ErrorRate(metric) => ("error_rate", &metric.metric_name, &metric.aggregation),
        ApplicationAlertRule::Errors(metric) => ("errors", &metric.metric_name, &metric.aggregation),
        ApplicationAlertRule::Slowness(metric) => ("slowness", &metric.metric_name, &metric.aggregation),
        ApplicationAlertRule::Throughput(metric) => ("throughput", &metric.metric_name, &metric.aggregation),
        ApplicationAlertRule::Logs(logs) => {
            put(&mut inner, "level", logs.level.as_str());
            put(&mut inner, "message", logs.message.clone());
            put(&mut inner, OPERATOR, logs.operator.as_str());
            ("logs", &logs.metric_name, &logs.aggregation)
        }
        ApplicationAlertRule::StatusCode(status) => {
            put(&mut inner, "status_code_start", status.status_code_start);
            put(&mut inner, "status_code_end", status.status_code_end);
            ("status_code", &status.metric_name, &status.aggregation)
        }
    };
    put(&mut inner, METRIC_NAME, metric_name.as_str());
    put(&mut inner, AGGREGATION, aggregation.clone());
    variant_container_value(&RULE_AXIS, block, inner)
}

/// Reads the selected rule block.
fn rule_from_block(block: &str, fields: &BlockView<'_>) -> ApplicationAlertRule {
    let metric = || CallMetric {
        metric_name: fields.string_or_empty(METRIC_NAME),
        aggregation: fields.string(AGGREGATION),
    };
    match block {
        "error_rate" => ApplicationAlertRule::ErrorRate(metric()),
        "errors" => ApplicationAlertRule::Errors(metric()),
        "logs" => ApplicationAlertRule::Logs(LogsRule {
            metric_name: fields.string_or_empty(METRIC_NAME),
            aggregation: fields.string(AGGREGATION),
            level: fields.string_or_empty("level"),
            message: fields.string("message"),
            operator: fields.string_or_empty(OPERATOR),
        }),
        "slowness" => ApplicationAlertRule::Slowness(metric()),
        "status_code" => ApplicationAlertRule::StatusCode(StatusCodeRule {
            metric_name: fields.string_or_empty(METRIC_NAME),
            aggregation: fields.string(AGGREGATION),
            status_code_start: fields.int("status_code_start"),
            status_code_end: fields.int("status_code_end"),
        }),
        _ => ApplicationAlertRule::Throughput(metric()),
    }
}

/// Converts the time threshold into its container value.
fn time_threshold_to_state(threshold: &ApplicationTimeThreshold) -> Result<Value, SyncError> {
    let mut inner = Map::new();
    let block = match threshold {
        ApplicationTimeThreshold::RequestImpact {
            time_window,
            requests,
        } => {
            put(&mut inner, TIME_WINDOW, *time_window);
            put(&mut inner, "requests", *requests);
            "request_impact"
        }
        ApplicationTimeThreshold::ViolationsInPeriod {
            time_window,
            violations,
        } => {
            put(&mut inner, TIME_WINDOW, *time_window);
            put(&mut inner, VIOLATIONS, *violations);
            "violations_in_period"
        }
        ApplicationTimeThreshold::ViolationsInSequence {
            time_window,
        } => {
            put(&mut inner, TIME_WINDOW, *time_window);
            "violations_in_sequence"
        }
    };
    variant_container_value(&TIME_THRESHOLD_AXIS, block, inner)
}

/// Reads the selected time threshold block.
fn time_threshold_from_block(block: &str, fields: &BlockView<'_>) -> ApplicationTimeThreshold {
    let time_window = fields.int(TIME_WINDOW).unwrap_or_default();
    match block {
        "request_impact" => ApplicationTimeThreshold::RequestImpact {
            time_window,
            requests: fields.int("requests").unwrap_or_default(),
        },
        "violations_in_period" => ApplicationTimeThreshold::ViolationsInPeriod {
            time_window,
            violations: fields.int(VIOLATIONS).unwrap_or_default(),
        },
        _ => ApplicationTimeThreshold::ViolationsInSequence {
            time_window,
        },
    }
}

impl ResourceHandle for ApplicationAlertConfigHandle {
    type Model = ApplicationAlertConfig;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, ApplicationAlertConfig> {
        RestResource::new(client, self.path, RestMode::PostCreatePostUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &ApplicationAlertConfig,
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
        state.set(APPLICATION, applications_to_state(&model.applications));
        state.set(BOUNDARY_SCOPE, model.boundary_scope.as_str());
        state.set(EVALUATION_TYPE, model.evaluation_type.as_str());
        state.set(INCLUDE_INTERNAL, model.include_internal);
        state.set(INCLUDE_SYNTHETIC, model.include_synthetic);
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
    ) -> Result<ApplicationAlertConfig, SyncError> {
        let rule = container_block(state, RULE, &RULE_AXIS)?;
        let (rule_block, rule_fields) = RULE_AXIS.select(&rule)?;
        let time_threshold = container_block(state, TIME_THRESHOLD, &TIME_THRESHOLD_AXIS)?;
        let (time_block, time_fields) = TIME_THRESHOLD_AXIS.select(&time_threshold)?;
        Ok(ApplicationAlertConfig {
            id: state.id().to_string(),
            name: name_from_state(state, formatter),
            description: state.string_or_empty(DESCRIPTION),
            applications: applications_from_state(state),
            boundary_scope: state.string_or_empty(BOUNDARY_SCOPE),
            evaluation_type: state.string_or_empty(EVALUATION_TYPE),
            include_internal: state.flag(INCLUDE_INTERNAL),
            include_synthetic: state.flag(INCLUDE_SYNTHETIC),
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
