// crates/monitor-sync-resources/src/website_monitoring_config.rs
// ============================================================================
// Module: Website Monitoring Config
// Description: Websites registered for end-user monitoring.
// Purpose: Map the name-only record created through a query parameter.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde
// ============================================================================

//! ## Overview
//! The remote creates and renames websites from the `name` query parameter
//! alone and derives `appName` itself, so `app_name` is computed in state.

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
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;

use crate::shared::name_fields;
use crate::shared::name_from_state;
use crate::shared::names_to_state;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "website_monitoring_config";
/// Collection path.
pub const PATH: &str = "/api/website-monitoring/config";
/// Server-derived application name.
pub const APP_NAME: &str = "app_name";

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote website monitoring config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteMonitoringConfig {
    /// Website ID.
    #[serde(default)]
    pub id: String,
    /// Full website name.
    pub name: String,
    /// Application name derived by the remote.
    #[serde(default)]
    pub app_name: String,
}

impl RestObject for WebsiteMonitoringConfig {
    fn id(&self) -> &str {
        &self.id
    }

    fn query_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Persisted fields of a website monitoring config.
#[must_use]
pub fn schema() -> Schema {
    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.push((APP_NAME, Field::string().computed()));
    Schema::new(fields)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for website monitoring configs.
#[derive(Debug, Clone)]
pub struct WebsiteMonitoringConfigHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl WebsiteMonitoringConfigHandle {
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

impl Default for WebsiteMonitoringConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for WebsiteMonitoringConfigHandle {
    type Model = WebsiteMonitoringConfig;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(
        &self,
        client: &'a RestClient,
    ) -> RestResource<'a, WebsiteMonitoringConfig> {
        RestResource::new(client, PATH, RestMode::NameQueryParameter)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &WebsiteMonitoringConfig,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        names_to_state(state, formatter, &model.name);
        state.set(APP_NAME, model.app_name.as_str());
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<WebsiteMonitoringConfig, SyncError> {
        Ok(WebsiteMonitoringConfig {
            id: state.id().to_string(),
            name: name_from_state(state, formatter),
            app_name: state.string_or_empty(APP_NAME),
        })
    }
}
