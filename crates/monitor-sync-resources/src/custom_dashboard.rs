// crates/monitor-sync-resources/src/custom_dashboard.rs
// ============================================================================
// Module: Custom Dashboard
// Description: Dashboards with access rules and an opaque widget document.
// Purpose: Store widgets as canonical JSON text so formatting never diffs.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde, serde_json
// ============================================================================

//! ## Overview
//! Widgets are an arbitrary JSON document owned by the dashboard editor. State
//! keeps them as text in canonical form (sorted keys, no insignificant
//! whitespace), and equivalent documents never produce a diff.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_core::Field;
use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::ResourceMetadata;
use monitor_sync_core::ResourceState;
use monitor_sync_core::Schema;
use monitor_sync_core::SyncError;
use monitor_sync_core::Validator;
use monitor_sync_core::core::canonical::canonical_value;
use monitor_sync_core::core::schema::canonical_json_state;
use monitor_sync_core::core::schema::suppress_equivalent_json;
use monitor_sync_core::core::state::block_list;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::shared::put;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "custom_dashboard";
/// Collection path.
pub const PATH: &str = "/api/custom-dashboard";

/// Short title.
pub const TITLE: &str = "title";
/// Title as stored remotely.
pub const FULL_TITLE: &str = "full_title";
/// Access rule list.
pub const ACCESS_RULE: &str = "access_rule";
/// Widget document.
pub const WIDGETS: &str = "widgets";

/// Access levels.
pub const ACCESS_TYPES: &[&str] = &["READ", "READ_WRITE"];
/// Principals an access rule may name.
pub const RELATION_TYPES: &[&str] = &["USER", "API_TOKEN", "ROLE", "TEAM", "GLOBAL"];

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote custom dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDashboard {
    /// Dashboard ID.
    #[serde(default)]
    pub id: String,
    /// Full title.
    pub title: String,
    /// Who may see or edit the dashboard.
    #[serde(default)]
    pub access_rules: Vec<AccessRule>,
    /// Widget document.
    #[serde(default)]
    pub widgets: Value,
}

impl RestObject for CustomDashboard {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Access rule of a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    /// `READ` or `READ_WRITE`.
    pub access_type: String,
    /// Principal kind.
    pub relation_type: String,
    /// Principal ID; absent for `GLOBAL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Persisted fields of a custom dashboard.
#[must_use]
pub fn schema() -> Schema {
    Schema::new([
        (TITLE, Field::string().required()),
        (FULL_TITLE, Field::string().computed()),
        (
            ACCESS_RULE,
            Field::block_list(Schema::new([
                ("access_type", Field::string().required().validate(Validator::OneOf(ACCESS_TYPES))),
                (
                    "relation_type",
                    Field::string().required().validate(Validator::OneOf(RELATION_TYPES)),
                ),
                ("related_id", Field::string()),
            ]))
            .required()
            .min_items(1),
        ),
        (
            WIDGETS,
            Field::string()
                .validate(Validator::Json)
                .state_func(canonical_json_state)
                .diff_suppress(suppress_equivalent_json)
                .describe("Widget document as JSON text."),
        ),
    ])
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for custom dashboards.
#[derive(Debug, Clone)]
pub struct CustomDashboardHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl CustomDashboardHandle {
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

impl Default for CustomDashboardHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for CustomDashboardHandle {
    type Model = CustomDashboard;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, CustomDashboard> {
        RestResource::new(client, PATH, RestMode::PostCreatePutUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &CustomDashboard,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        let widgets = if model.widgets.is_null() { None } else { Some(canonical_value(&model.widgets)?) };
        formatter.write_names(state, &model.title, TITLE, FULL_TITLE);
        let rules = model.access_rules.iter().map(|rule| {
            let mut block = Map::new();
            put(&mut block, "access_type", rule.access_type.as_str());
            put(&mut block, "relation_type", rule.relation_type.as_str());
            put(&mut block, "related_id", rule.related_id.clone());
            block
        });
        state.set(ACCESS_RULE, block_list(rules));
        state.set(WIDGETS, widgets);
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<CustomDashboard, SyncError> {
        let widgets = match state.string(WIDGETS) {
            Some(text) => serde_json::from_str(&text)
                .map_err(|err| SyncError::Parse(format!("{WIDGETS}: {err}")))?,
            None => Value::Null,
        };
        let access_rules = state
            .blocks(ACCESS_RULE)
            .iter()
            .map(|rule| AccessRule {
                access_type: rule.string_or_empty("access_type"),
                relation_type: rule.string_or_empty("relation_type"),
                related_id: rule.string("related_id"),
            })
            .collect();
        Ok(CustomDashboard {
            id: state.id().to_string(),
            title: formatter.full_name_for(state, TITLE, FULL_TITLE),
            access_rules,
            widgets,
        })
    }
}
