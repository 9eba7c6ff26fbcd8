// crates/monitor-sync-resources/src/api_token.rs
// ============================================================================
// Module: API Token
// Description: Access tokens with account-level permission flags.
// Purpose: Map the flat token record with client-generated secrets.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde, uuid
// ============================================================================

//! ## Overview
//! The token ID and the access granting token are generated on the client
//! before create; the remote issues `internalId`. Permissions are the shared
//! flag table, flattened into the wire record.

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
use uuid::Uuid;

use crate::shared::Permissions;
use crate::shared::name_fields;
use crate::shared::name_from_state;
use crate::shared::names_to_state;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "api_token";
/// Collection path.
pub const PATH: &str = "/api/settings/api-tokens";
/// Client-generated secret.
pub const ACCESS_GRANTING_TOKEN: &str = "access_granting_token";
/// Server-issued internal ID.
pub const INTERNAL_ID: &str = "internal_id";

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    /// Token ID.
    #[serde(default)]
    pub id: String,
    /// Secret presented by clients.
    pub access_granting_token: String,
    /// Internal ID assigned by the remote.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub internal_id: String,
    /// Full token name.
    pub name: String,
    /// Granted permissions.
    #[serde(flatten)]
    pub permissions: Permissions,
}

impl RestObject for ApiToken {
    fn id(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Persisted fields of an API token.
#[must_use]
pub fn schema() -> Schema {
    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.push((ACCESS_GRANTING_TOKEN, Field::string().computed().sensitive()));
    fields.push((INTERNAL_ID, Field::string().computed()));
    fields.extend(Permissions::schema_fields());
    Schema::new(fields)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for API tokens.
#[derive(Debug, Clone)]
pub struct ApiTokenHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl ApiTokenHandle {
    /// Creates the handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetadata {
                name: RESOURCE_NAME,
                schema: schema(),
                schema_version: 0,
                id_field: None,
                skip_id_generation: false,
            },
        }
    }
}

impl Default for ApiTokenHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for ApiTokenHandle {
    type Model = ApiToken;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, ApiToken> {
        RestResource::new(client, PATH, RestMode::PutCreatePutUpdate)
    }

    fn set_computed_fields(&self, state: &mut ResourceState) -> Result<(), SyncError> {
        state.set(ACCESS_GRANTING_TOKEN, Uuid::new_v4().to_string());
        Ok(())
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &ApiToken,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        names_to_state(state, formatter, &model.name);
        state.set(ACCESS_GRANTING_TOKEN, model.access_granting_token.as_str());
        state.set(INTERNAL_ID, model.internal_id.as_str());
        model.permissions.write_state(state);
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<ApiToken, SyncError> {
        Ok(ApiToken {
            id: state.id().to_string(),
            access_granting_token: state.string_or_empty(ACCESS_GRANTING_TOKEN),
            internal_id: state.string_or_empty(INTERNAL_ID),
            name: name_from_state(state, formatter),
            permissions: Permissions::from_state(state),
        })
    }
}
