// crates/monitor-sync-core/src/interfaces/mod.rs
// ============================================================================
// Module: Monitor Sync Interfaces
// Description: Contracts between resource handles, the driver, and the host.
// Purpose: Define the per-kind handle surface and the object-safe resource API.
// Dependencies: crate::core, crate::runtime, monitor-sync-rest
// ============================================================================

//! ## Overview
//! A [`ResourceHandle`] describes one entity kind: its schema, its upgraders,
//! the REST collection it lives in, and the two conversions between state
//! and the remote model. Handles are immutable after construction and shared
//! freely between threads.
//! [`Resource`] is the object-safe surface the host orchestrator drives; the
//! generic driver implements it for every handle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_rest::RequestContext;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde_json::Map;
use serde_json::Value;

use crate::core::error::SyncError;
use crate::core::migration::StateUpgrader;
use crate::core::naming::NameFormatter;
use crate::core::schema::Schema;
use crate::core::state::ResourceState;
use crate::runtime::meta::ProviderMeta;

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Static description of an entity kind.
///
/// # Invariants
/// - `schema_version` equals the number of upgraders the handle returns.
#[derive(Debug, Clone)]
pub struct ResourceMetadata {
    /// Resource name used by the host, e.g. `alerting_channel`.
    pub name: &'static str,
    /// Persisted fields.
    pub schema: Schema,
    /// Current schema version.
    pub schema_version: u32,
    /// State field that mirrors the resource ID, if any.
    pub id_field: Option<&'static str>,
    /// The remote assigns IDs; the driver must not generate one.
    pub skip_id_generation: bool,
}

// ============================================================================
// SECTION: Resource Handle
// ============================================================================

/// Per-kind binding of schema, conversions, and REST collection.
pub trait ResourceHandle: Send + Sync {
    /// Remote record type.
    type Model: RestObject;

    /// Returns the static description.
    fn metadata(&self) -> &ResourceMetadata;

    /// Returns the upgraders, one per schema version step.
    fn state_upgraders(&self) -> Vec<StateUpgrader> {
        Vec::new()
    }

    /// Returns the REST client for this kind.
    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, Self::Model>;

    /// Fills client-generated fields before a create.
    ///
    /// # Errors
    /// Returns [`SyncError`] when a value cannot be generated.
    fn set_computed_fields(&self, _state: &mut ResourceState) -> Result<(), SyncError> {
        Ok(())
    }

    /// Writes every schema field from the remote model.
    ///
    /// # Errors
    /// Returns [`SyncError`] when the model holds values the state cannot
    /// represent, such as an unknown severity or discriminator.
    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &Self::Model,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError>;

    /// Builds a fresh model from state.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] when no or several variants are
    /// selected or a value cannot be mapped.
    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<Self::Model, SyncError>;
}

// ============================================================================
// SECTION: Resource
// ============================================================================

/// Object-safe CRUD surface driven by the host orchestrator.
///
/// All operations leave `state` untouched when they fail.
pub trait Resource: Send + Sync {
    /// Returns the resource name.
    fn name(&self) -> &'static str;

    /// Returns the persisted field map.
    fn schema(&self) -> &Schema;

    /// Returns the current schema version.
    fn schema_version(&self) -> u32;

    /// Upgrades a raw map stored at `from` to the current version.
    ///
    /// # Errors
    /// Returns [`SyncError::Migration`] when an upgrader fails.
    fn upgrade(&self, raw: Map<String, Value>, from: u32) -> Result<Map<String, Value>, SyncError>;

    /// Creates the remote entity and records its ID.
    ///
    /// # Errors
    /// Returns validation, migration, or transport errors.
    fn create(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError>;

    /// Refreshes state from the remote; clears the ID when the entity is gone.
    ///
    /// # Errors
    /// Returns [`SyncError::MissingId`] or transport errors other than 404.
    fn read(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError>;

    /// Pushes state to the existing remote entity.
    ///
    /// # Errors
    /// Returns validation, migration, or transport errors.
    fn update(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError>;

    /// Deletes the remote entity and clears the ID.
    ///
    /// # Errors
    /// Returns [`SyncError::MissingId`] or transport errors other than 404.
    fn delete(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError>;

    /// Builds a fully populated state for an existing remote entity.
    ///
    /// # Errors
    /// Returns not-found or transport errors.
    fn import(
        &self,
        id: &str,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<ResourceState, SyncError>;
}
