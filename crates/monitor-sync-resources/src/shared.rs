// crates/monitor-sync-resources/src/shared.rs
// ============================================================================
// Module: Shared Resource Tables
// Description: Field names, enumerations, and mapper helpers used by handles.
// Purpose: Keep cross-cutting wire conventions in one place.
// Dependencies: monitor-sync-core, serde, serde_json, tag-filter
// ============================================================================

//! ## Overview
//! Every handle depends on this module and on nothing else in the crate.
//! It holds:
//! - shared field names and the `name` / `full_name` pair,
//! - the severity bijection (`warning <-> 5`, `critical <-> 10`),
//! - custom payload fields, granularities, and alert thresholds,
//! - tag-filter conversion between the normalized text and the wire tree,
//! - helpers that build variant sibling fields and emit them into state,
//! - the permission flag table shared by API tokens and user roles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_core::BlockView;
use monitor_sync_core::Field;
use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::ResourceState;
use monitor_sync_core::Schema;
use monitor_sync_core::SyncError;
use monitor_sync_core::Validator;
use monitor_sync_core::ValueType;
use monitor_sync_core::VariantAxis;
use monitor_sync_core::core::schema::normalized_tag_filter_state;
use monitor_sync_core::core::schema::suppress_equivalent_tag_filter;
use monitor_sync_core::core::state::single_block;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tag_filter::TagFilter;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Short name as written by the user.
pub const NAME: &str = "name";
/// Name as stored remotely, including configured affixes.
pub const FULL_NAME: &str = "full_name";
/// Free text description.
pub const DESCRIPTION: &str = "description";
/// Enabled flag.
pub const ENABLED: &str = "enabled";
/// Whether an alert also opens an incident.
pub const TRIGGERING: &str = "triggering";
/// Severity as `warning` or `critical`.
pub const SEVERITY: &str = "severity";
/// Evaluation granularity in milliseconds.
pub const GRANULARITY: &str = "granularity";
/// Normalized tag-filter expression.
pub const TAG_FILTER: &str = "tag_filter";
/// Referenced alerting channel IDs.
pub const ALERT_CHANNEL_IDS: &str = "alert_channel_ids";
/// Custom payload field set.
pub const CUSTOM_PAYLOAD_FIELD: &str = "custom_payload_field";
/// Rule container block.
pub const RULE: &str = "rule";
/// Threshold container block.
pub const THRESHOLD: &str = "threshold";
/// Time threshold container block.
pub const TIME_THRESHOLD: &str = "time_threshold";
/// Metric name inside rules.
pub const METRIC_NAME: &str = "metric_name";
/// Aggregation inside rules.
pub const AGGREGATION: &str = "aggregation";
/// Comparison operator.
pub const OPERATOR: &str = "operator";
/// Comparison value.
pub const VALUE: &str = "value";
/// Time window in milliseconds.
pub const TIME_WINDOW: &str = "time_window";
/// Number of violations.
pub const VIOLATIONS: &str = "violations";

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Wire value `5`.
    Warning,
    /// Wire value `10`.
    Critical,
}

impl Severity {
    /// Accepted state spellings.
    pub const STATE_VALUES: &'static [&'static str] = &["warning", "critical"];

    /// Parses the state spelling.
    ///
    /// # Errors
    /// Returns `<value> is not a valid severity` for anything else.
    pub fn from_state(value: &str) -> Result<Self, SyncError> {
        match value {
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(SyncError::validation(format!("{other} is not a valid severity"))),
        }
    }

    /// Parses the wire integer.
    ///
    /// # Errors
    /// Returns `<value> is not a valid severity` for anything but 5 and 10.
    pub fn from_wire(value: i64) -> Result<Self, SyncError> {
        match value {
            5 => Ok(Self::Warning),
            10 => Ok(Self::Critical),
            other => Err(SyncError::validation(format!("{other} is not a valid severity"))),
        }
    }

    /// Returns the state spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Returns the wire integer.
    #[must_use]
    pub const fn wire(self) -> i64 {
        match self {
            Self::Warning => 5,
            Self::Critical => 10,
        }
    }
}

/// Required severity field.
#[must_use]
pub fn severity_field() -> Field {
    Field::string()
        .required()
        .validate(Validator::OneOf(Severity::STATE_VALUES))
        .describe("Severity of the alert: warning or critical.")
}

/// Reads the severity of a block and converts it to the wire integer.
///
/// # Errors
/// Returns a validation error when the severity is missing or unknown.
pub fn severity_from_state<F: Fields>(source: &F) -> Result<i64, SyncError> {
    Severity::from_state(&source.string_or_empty(SEVERITY)).map(Severity::wire)
}

/// Converts a wire severity to its state spelling.
///
/// # Errors
/// Returns a validation error naming the unknown integer.
pub fn severity_to_state(value: i64) -> Result<&'static str, SyncError> {
    Severity::from_wire(value).map(Severity::as_str)
}

// ============================================================================
// SECTION: Names
// ============================================================================

/// The `name` / `full_name` field pair.
#[must_use]
pub fn name_fields() -> [(&'static str, Field); 2] {
    [
        (NAME, Field::string().required().describe("Name without configured prefix and suffix.")),
        (FULL_NAME, Field::string().computed().describe("Name as stored remotely.")),
    ]
}

/// Writes the remote name into the pair.
pub fn names_to_state(state: &mut ResourceState, formatter: &NameFormatter, full_name: &str) {
    formatter.write_names(state, full_name, NAME, FULL_NAME);
}

/// Returns the remote name to send.
#[must_use]
pub fn name_from_state(state: &ResourceState, formatter: &NameFormatter) -> String {
    formatter.full_name_for(state, NAME, FULL_NAME)
}

// ============================================================================
// SECTION: Custom Payload Fields
// ============================================================================

/// Maximum entries in a custom payload field set.
pub const MAX_CUSTOM_PAYLOAD_FIELDS: usize = 20;
/// The only supported payload field type.
pub const STATIC_STRING: &str = "staticString";

/// Extra key/value pair attached to alert notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPayloadField {
    /// Payload field type; always `staticString`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Field key, unique within the set.
    pub key: String,
    /// Field value.
    pub value: String,
}

impl CustomPayloadField {
    /// Creates a static string field.
    #[must_use]
    pub fn static_string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_type: STATIC_STRING.to_string(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Custom payload field set, keyed by `key`.
#[must_use]
pub fn custom_payload_field() -> Field {
    Field::block_set(Schema::new([
        ("key", Field::string().required()),
        ("value", Field::string().required()),
    ]))
    .max_items(MAX_CUSTOM_PAYLOAD_FIELDS)
    .describe("Custom payload fields sent with alert notifications.")
}

/// Reads the custom payload field set.
///
/// # Errors
/// Returns a validation error for duplicate keys or too many entries.
pub fn custom_payload_fields_from_state<F: Fields>(
    source: &F,
) -> Result<Vec<CustomPayloadField>, SyncError> {
    let mut fields: Vec<CustomPayloadField> = source
        .blocks(CUSTOM_PAYLOAD_FIELD)
        .iter()
        .map(|block| {
            CustomPayloadField::static_string(block.string_or_empty("key"), block.string_or_empty("value"))
        })
        .collect();
    if fields.len() > MAX_CUSTOM_PAYLOAD_FIELDS {
        return Err(SyncError::validation(format!(
            "{CUSTOM_PAYLOAD_FIELD}: attribute supports {MAX_CUSTOM_PAYLOAD_FIELDS} item maximum, but config has {} declared",
            fields.len()
        )));
    }
    fields.sort_by(|left, right| left.key.cmp(&right.key));
    if let Some(pair) = fields.windows(2).find(|pair| pair[0].key == pair[1].key) {
        return Err(SyncError::validation(format!(
            "custom payload field key {} is declared more than once",
            pair[0].key
        )));
    }
    Ok(fields)
}

/// Converts wire payload fields to the state set.
///
/// # Errors
/// Returns a validation error for unsupported field types.
pub fn custom_payload_fields_to_state(fields: &[CustomPayloadField]) -> Result<Value, SyncError> {
    let mut items = Vec::with_capacity(fields.len());
    for field in fields {
        if field.field_type != STATIC_STRING {
            return Err(SyncError::validation(format!(
                "{} is not a supported custom payload field type",
                field.field_type
            )));
        }
        let mut item = Map::new();
        item.insert("key".to_string(), Value::String(field.key.clone()));
        item.insert("value".to_string(), Value::String(field.value.clone()));
        items.push(Value::Object(item));
    }
    Ok(Value::Array(items))
}

// ============================================================================
// SECTION: Granularity
// ============================================================================

/// Supported evaluation granularities in milliseconds.
pub const GRANULARITIES: &[i64] = &[300_000, 600_000, 900_000, 1_200_000, 1_800_000];
/// Granularity applied when none is configured.
pub const DEFAULT_GRANULARITY: i64 = 600_000;

/// Granularity field with its default.
#[must_use]
pub fn granularity_field() -> Field {
    Field::int()
        .default_value(DEFAULT_GRANULARITY)
        .validate(Validator::IntOneOf(GRANULARITIES))
        .describe("Evaluation granularity in milliseconds.")
}

// ============================================================================
// SECTION: Tag Filter
// ============================================================================

/// Optional tag-filter expression stored in normalized form.
#[must_use]
pub fn tag_filter_field() -> Field {
    Field::string()
        .validate(Validator::TagFilter)
        .diff_suppress(suppress_equivalent_tag_filter)
        .state_func(normalized_tag_filter_state)
        .describe("Tag-filter expression limiting the alert scope.")
}

/// Converts the stored expression to the wire tree.
///
/// # Errors
/// Returns [`SyncError::Parse`] when the expression does not parse.
pub fn tag_filter_to_wire(expression: Option<&str>) -> Result<TagFilter, SyncError> {
    match expression.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => Ok(TagFilter::from_expression(&tag_filter::parse(text)?)),
        None => Ok(TagFilter::empty()),
    }
}

/// Converts the wire tree to the normalized expression, `None` when empty.
///
/// # Errors
/// Returns [`SyncError::Parse`] when the tree is malformed.
pub fn tag_filter_from_wire(filter: Option<&TagFilter>) -> Result<Option<String>, SyncError> {
    let Some(filter) = filter else {
        return Ok(None);
    };
    Ok(filter.to_expression()?.map(|expression| expression.to_string()))
}

// ============================================================================
// SECTION: Variant Helpers
// ============================================================================

/// Unwraps a JSON object into a block map; other values yield an empty map.
#[must_use]
pub fn into_block(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Builds the sibling fields of a variant axis, each limited to one block
/// and grouped by `exactly_one_of`.
#[must_use]
pub fn variant_fields(
    axis: &VariantAxis,
    variants: Vec<(&'static str, Schema)>,
) -> Vec<(&'static str, Field)> {
    let group = axis.block_names();
    variants
        .into_iter()
        .map(|(block, schema)| (block, Field::block_list(schema).max_items(1).exactly_one_of(&group)))
        .collect()
}

/// Builds a required single-element container holding a variant axis.
#[must_use]
pub fn variant_container(axis: &VariantAxis, variants: Vec<(&'static str, Schema)>) -> Field {
    Field::block_list(Schema::new(variant_fields(axis, variants))).required().min_items(1).max_items(1)
}

/// Emits all siblings of `axis` as top-level state fields.
///
/// # Errors
/// Returns a validation error when `chosen` is not a sibling.
pub fn emit_variant(
    state: &mut ResourceState,
    axis: &VariantAxis,
    chosen: &str,
    inner: Map<String, Value>,
) -> Result<(), SyncError> {
    let mut siblings = Map::new();
    axis.emit(&mut siblings, chosen, inner)?;
    for (block, value) in siblings {
        state.set(&block, value);
    }
    Ok(())
}

/// Emits all siblings of `axis` into a single-element container value.
///
/// # Errors
/// Returns a validation error when `chosen` is not a sibling.
pub fn variant_container_value(
    axis: &VariantAxis,
    chosen: &str,
    inner: Map<String, Value>,
) -> Result<Value, SyncError> {
    let mut siblings = Map::new();
    axis.emit(&mut siblings, chosen, inner)?;
    Ok(single_block(siblings))
}

/// Returns the single-element container block holding a variant axis.
///
/// # Errors
/// Returns `no supported <label> defined` when the container is empty.
pub fn container_block<'a, F: Fields>(
    source: &'a F,
    container: &str,
    axis: &VariantAxis,
) -> Result<BlockView<'a>, SyncError> {
    source
        .block(container)
        .ok_or_else(|| SyncError::validation(format!("no supported {} defined", axis.label)))
}

/// Inserts a value; `None` is written as `null`.
pub fn put(block: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    block.insert(key.to_string(), value.into());
}

// ============================================================================
// SECTION: Alert Thresholds
// ============================================================================

/// Threshold axis shared by website and application alert configs.
pub const THRESHOLD_AXIS: VariantAxis = VariantAxis {
    label: "threshold",
    variants: &[("staticThreshold", "static"), ("historicBaseline", "historic_baseline")],
};

/// Threshold comparison operators.
pub const THRESHOLD_OPERATORS: &[&str] = &[">", ">=", "<", "<="];
/// Seasonalities of a historic baseline.
pub const SEASONALITIES: &[&str] = &["DAILY", "WEEKLY"];

/// Threshold condition of an alert config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Threshold {
    /// Fixed value.
    #[serde(rename = "staticThreshold", rename_all = "camelCase")]
    Static {
        /// Comparison operator.
        operator: String,
        /// Threshold value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        /// Last update timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_updated: Option<i64>,
    },
    /// Deviation from a learned baseline.
    #[serde(rename = "historicBaseline", rename_all = "camelCase")]
    HistoricBaseline {
        /// Comparison operator.
        operator: String,
        /// Allowed deviation factor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deviation_factor: Option<f64>,
        /// Baseline seasonality.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seasonality: Option<String>,
    },
}

/// Threshold container field.
#[must_use]
pub fn threshold_field() -> Field {
    let operator = || Field::string().required().validate(Validator::OneOf(THRESHOLD_OPERATORS));
    variant_container(&THRESHOLD_AXIS, vec![
        (
            "static",
            Schema::new([
                (OPERATOR, operator()),
                (VALUE, Field::float()),
                ("last_updated", Field::int().optional_computed()),
            ]),
        ),
        (
            "historic_baseline",
            Schema::new([
                (OPERATOR, operator()),
                ("deviation_factor", Field::float().validate(Validator::FloatRange {
                    min: 0.5,
                    max: 16.0,
                })),
                ("seasonality", Field::string().validate(Validator::OneOf(SEASONALITIES))),
            ]),
        ),
    ])
    .describe("Threshold condition of the rule.")
}

/// Reads the threshold container.
///
/// # Errors
/// Returns a validation error unless exactly one variant is set.
pub fn threshold_from_state<F: Fields>(source: &F) -> Result<Threshold, SyncError> {
    let container = container_block(source, THRESHOLD, &THRESHOLD_AXIS)?;
    let (variant, block) = THRESHOLD_AXIS.select(&container)?;
    let operator = block.string_or_empty(OPERATOR);
    match variant {
        "static" => Ok(Threshold::Static {
            operator,
            value: block.float(VALUE),
            last_updated: block.int("last_updated"),
        }),
        _ => Ok(Threshold::HistoricBaseline {
            operator,
            deviation_factor: block.float("deviation_factor"),
            seasonality: block.string("seasonality"),
        }),
    }
}

/// Converts a threshold to its container value.
///
/// # Errors
/// Never fails for the declared variants.
pub fn threshold_to_state(threshold: &Threshold) -> Result<Value, SyncError> {
    let mut inner = Map::new();
    let chosen = match threshold {
        Threshold::Static {
            operator,
            value,
            last_updated,
        } => {
            put(&mut inner, OPERATOR, operator.as_str());
            put(&mut inner, VALUE, *value);
            put(&mut inner, "last_updated", *last_updated);
            "static"
        }
        Threshold::HistoricBaseline {
            operator,
            deviation_factor,
            seasonality,
        } => {
            put(&mut inner, OPERATOR, operator.as_str());
            put(&mut inner, "deviation_factor", *deviation_factor);
            put(&mut inner, "seasonality", seasonality.clone());
            "historic_baseline"
        }
    };
    variant_container_value(&THRESHOLD_AXIS, chosen, inner)
}

/// Set of referenced alerting channel IDs.
#[must_use]
pub fn alert_channel_ids_field() -> Field {
    Field::set(ValueType::String).describe("IDs of the alerting channels to notify.")
}

// ============================================================================
// SECTION: Permission Flags
// ============================================================================

/// Declares the permission flag record together with its schema fields and
/// state mappers, so the flag list exists exactly once.
macro_rules! permission_flags {
    ($(#[$meta:meta])* $name:ident { $($flag:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                #[doc = concat!("Grants `", stringify!($flag), "`.")]
                #[serde(default)]
                pub $flag: bool,
            )*
        }

        impl $name {
            /// State field names, in declaration order.
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($flag)),*];

            /// Boolean schema fields defaulting to `false`.
            #[must_use]
            pub fn schema_fields() -> Vec<(&'static str, Field)> {
                vec![$((stringify!($flag), Field::bool().default_value(false))),*]
            }

            /// Reads every flag; unset flags are `false`.
            #[must_use]
            pub fn from_state<F: Fields>(source: &F) -> Self {
                Self {
                    $($flag: source.flag(stringify!($flag)),)*
                }
            }

            /// Writes every flag.
            pub fn write_state(&self, state: &mut ResourceState) {
                $(state.set(stringify!($flag), self.$flag);)*
            }
        }
    };
}

permission_flags! {
    /// Account-level permissions granted to API tokens and user roles.
    Permissions {
        can_configure_service_mapping,
        can_configure_eum_applications,
        can_configure_mobile_app_monitoring,
        can_configure_users,
        can_install_new_agents,
        can_see_usage_information,
        can_configure_integrations,
        can_see_on_premise_license_information,
        can_configure_roles,
        can_configure_custom_alerts,
        can_configure_api_tokens,
        can_configure_agent_run_mode,
        can_view_audit_log,
        can_configure_agents,
        can_configure_authentication_methods,
        can_configure_applications,
        can_configure_teams,
        can_configure_releases,
        can_configure_log_management,
        can_create_public_custom_dashboards,
        can_view_logs,
        can_view_trace_details,
        can_configure_session_settings,
        can_configure_service_level_indicators,
        can_configure_global_alert_payload,
        can_configure_global_alert_configs,
        can_view_account_and_billing_information,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test assertions use unwrap for clarity.")]

    use serde_json::json;

    use super::*;

    #[test]
    fn severity_round_trips_and_rejects_unknown_values() {
        assert_eq!(Severity::from_state("warning").unwrap().wire(), 5);
        assert_eq!(severity_to_state(10).unwrap(), "critical");
        assert_eq!(Severity::from_state("minor").unwrap_err().to_string(), "minor is not a valid severity");
        assert_eq!(severity_to_state(7).unwrap_err().to_string(), "7 is not a valid severity");
    }

    #[test]
    fn permissions_cover_the_flag_table() {
        assert_eq!(Permissions::FIELDS.len(), 27);
        let wire = serde_json::to_value(Permissions {
            can_view_logs: true,
            ..Permissions::default()
        })
        .unwrap();
        assert_eq!(wire["canViewLogs"], json!(true));
        assert_eq!(wire["canConfigureEumApplications"], json!(false));
    }

    #[test]
    fn payload_fields_reject_duplicates() {
        let values = into_block(json!({
            "custom_payload_field": [
                {"key": "team", "value": "a"},
                {"key": "team", "value": "b"},
            ]
        }));
        let err = custom_payload_fields_from_state(&values).unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn empty_tag_filter_maps_to_empty_expression() {
        let wire = tag_filter_to_wire(Some("  ")).unwrap();
        assert_eq!(wire, TagFilter::empty());
        assert_eq!(tag_filter_from_wire(Some(&wire)).unwrap(), None);
    }
}
