// crates/monitor-sync-resources/src/user_role.rs
// ============================================================================
// Module: User Role
// Description: Named permission sets assigned to users.
// Purpose: Map role records and migrate state written before version 1.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde
// ============================================================================

//! ## Overview
//! Roles keep their name verbatim; the configured prefix and suffix do not
//! apply. Version 0 state carried `implicit_view_filter`, which the remote
//! retired; the upgrader drops it.

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
use monitor_sync_core::StateUpgrader;
use monitor_sync_core::SyncError;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::shared::NAME;
use crate::shared::Permissions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "user_role";
/// Collection path.
pub const PATH: &str = "/api/settings/roles";
/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;
/// Field retired in version 1.
pub const IMPLICIT_VIEW_FILTER: &str = "implicit_view_filter";

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote user role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    /// Role ID.
    #[serde(default)]
    pub id: String,
    /// Role name.
    pub name: String,
    /// Granted permissions.
    #[serde(flatten)]
    pub permissions: Permissions,
}

impl RestObject for UserRole {
    fn id(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Persisted fields of a user role.
#[must_use]
pub fn schema() -> Schema {
    let mut fields = vec![(NAME, Field::string().required().describe("Role name."))];
    fields.extend(Permissions::schema_fields());
    Schema::new(fields)
}

/// Drops the retired implicit view filter.
fn drop_implicit_view_filter(mut raw: Map<String, Value>) -> Result<Map<String, Value>, String> {
    raw.remove(IMPLICIT_VIEW_FILTER);
    Ok(raw)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for user roles.
#[derive(Debug, Clone)]
pub struct UserRoleHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl UserRoleHandle {
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

impl Default for UserRoleHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for UserRoleHandle {
    type Model = UserRole;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn state_upgraders(&self) -> Vec<StateUpgrader> {
        vec![StateUpgrader {
            version: 0,
            upgrade: drop_implicit_view_filter,
        }]
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, UserRole> {
        RestResource::new(client, PATH, RestMode::PutCreatePutUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &UserRole,
        _formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        state.set(NAME, model.name.as_str());
        model.permissions.write_state(state);
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        _formatter: &NameFormatter,
    ) -> Result<UserRole, SyncError> {
        Ok(UserRole {
            id: state.id().to_string(),
            name: state.string_or_empty(NAME),
            permissions: Permissions::from_state(state),
        })
    }
}
