// crates/monitor-sync-core/src/runtime/driver.rs
// ============================================================================
// Module: CRUD Driver
// Description: Generic create/read/update/delete/import over a handle.
// Purpose: Keep lifecycle rules in one place for every entity kind.
// Dependencies: crate::core, crate::interfaces, monitor-sync-rest, tracing, uuid
// ============================================================================

//! ## Overview
//! [`new_managed_resource`] wraps a [`ResourceHandle`] into a
//! [`ManagedResource`] implementing [`Resource`]. Every operation works on a
//! copy of the state and commits it only after the remote call succeeded, so
//! failures never leave a partially updated state behind.
//! Invariants:
//! - A handle whose upgraders leave a gap or repeat a version is rejected at
//!   construction.
//! - Stored state older than the handle's schema version is upgraded before
//!   any other step; upgrade failures abort without a remote call.
//! - Validation runs before any remote call on create and update.
//! - Read on a missing entity clears the ID and succeeds.
//! - Written state is normalized by the schema, so repeated reads of an
//!   unchanged entity yield identical state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_rest::RequestContext;
use monitor_sync_rest::RestError;
use monitor_sync_rest::RestObject;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::SyncError;
use crate::core::migration::StateUpgrader;
use crate::core::migration::check_upgraders;
use crate::core::migration::upgrade_state;
use crate::core::schema::Schema;
use crate::core::state::ResourceState;
use crate::interfaces::Resource;
use crate::interfaces::ResourceHandle;
use crate::runtime::meta::ProviderMeta;

// ============================================================================
// SECTION: Managed Resource
// ============================================================================

/// Generic driver bound to one handle.
#[derive(Debug)]
pub struct ManagedResource<H> {
    /// Entity-specific behaviour.
    handle: H,
    /// Upgraders captured at construction.
    upgraders: Vec<StateUpgrader>,
}

/// Wraps a handle into a driver after checking its upgrader chain.
///
/// # Errors
/// Returns [`SyncError::Migration`] unless every version below the handle's
/// schema version has exactly one upgrader.
pub fn new_managed_resource<H: ResourceHandle>(
    handle: H,
) -> Result<ManagedResource<H>, SyncError> {
    let upgraders = handle.state_upgraders();
    check_upgraders(handle.metadata().schema_version, &upgraders)?;
    Ok(ManagedResource {
        handle,
        upgraders,
    })
}

impl<H: ResourceHandle> ManagedResource<H> {
    /// Returns the wrapped handle.
    #[must_use]
    pub const fn handle(&self) -> &H {
        &self.handle
    }

    /// Copies the state and upgrades it to the current schema version.
    fn prepare(&self, state: &ResourceState) -> Result<ResourceState, SyncError> {
        let mut working = state.clone();
        let target = self.schema_version();
        if working.schema_version() != target {
            let values = self.upgrade(working.values().clone(), working.schema_version())?;
            working.set_values(values);
            working.set_schema_version(target);
        }
        Ok(working)
    }

    /// Normalizes and commits a state after a successful remote call.
    fn finish(&self, working: &mut ResourceState, id: &str) {
        working.set_id(id);
        let mut values = self.schema().normalize(working.values());
        if let Some(field) = self.handle.metadata().id_field {
            values.insert(field.to_string(), Value::String(id.to_string()));
        }
        working.set_values(values);
        working.commit();
    }

    /// Returns the ID of a state or fails when it is empty.
    fn require_id(state: &ResourceState) -> Result<String, SyncError> {
        let id = state.id().trim();
        if id.is_empty() { Err(SyncError::MissingId) } else { Ok(id.to_string()) }
    }
}

impl<H: ResourceHandle> Resource for ManagedResource<H> {
    fn name(&self) -> &'static str {
        self.handle.metadata().name
    }

    fn schema(&self) -> &Schema {
        &self.handle.metadata().schema
    }

    fn schema_version(&self) -> u32 {
        self.handle.metadata().schema_version
    }

    fn upgrade(&self, raw: Map<String, Value>, from: u32) -> Result<Map<String, Value>, SyncError> {
        let upgraded =
            upgrade_state(self.name(), raw, from, self.schema_version(), &self.upgraders)?;
        Ok(self.schema().normalize(&upgraded))
    }

    fn create(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError> {
        debug!(resource = self.name(), "create");
        let mut working = self.prepare(state)?;
        self.schema().validate(working.values())?;
        if !self.handle.metadata().skip_id_generation {
            working.set_id(Uuid::new_v4().to_string());
            self.handle.set_computed_fields(&mut working)?;
        }
        let model = self.handle.map_state_to_model(&working, meta.formatter())?;
        let created = self.handle.rest_resource(meta.client()).create(&model, ctx)?;
        self.handle.update_state(&mut working, &created, meta.formatter())?;
        self.finish(&mut working, created.id());
        debug!(resource = self.name(), id = working.id(), "created");
        *state = working;
        Ok(())
    }

    fn read(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError> {
        let id = Self::require_id(state)?;
        debug!(resource = self.name(), id = %id, "read");
        let mut working = self.prepare(state)?;
        let model = match self.handle.rest_resource(meta.client()).get_one(&id, ctx) {
            Ok(model) => model,
            Err(RestError::NotFound) => {
                debug!(resource = self.name(), id = %id, "entity gone; clearing id");
                state.clear_id();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        self.handle.update_state(&mut working, &model, meta.formatter())?;
        self.finish(&mut working, model.id());
        *state = working;
        Ok(())
    }

    fn update(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError> {
        let id = Self::require_id(state)?;
        debug!(resource = self.name(), id = %id, "update");
        let mut working = self.prepare(state)?;
        self.schema().validate(working.values())?;
        let model = self.handle.map_state_to_model(&working, meta.formatter())?;
        let updated = self.handle.rest_resource(meta.client()).update(&model, ctx)?;
        self.handle.update_state(&mut working, &updated, meta.formatter())?;
        let remote_id = if updated.id().is_empty() { id } else { updated.id().to_string() };
        self.finish(&mut working, &remote_id);
        *state = working;
        Ok(())
    }

    fn delete(
        &self,
        state: &mut ResourceState,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<(), SyncError> {
        let id = Self::require_id(state)?;
        debug!(resource = self.name(), id = %id, "delete");
        self.handle.rest_resource(meta.client()).delete_by_id(&id, ctx)?;
        state.clear_id();
        Ok(())
    }

    fn import(
        &self,
        id: &str,
        meta: &ProviderMeta,
        ctx: &RequestContext,
    ) -> Result<ResourceState, SyncError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SyncError::MissingId);
        }
        debug!(resource = self.name(), id, "import");
        let model = self.handle.rest_resource(meta.client()).get_one(id, ctx)?;
        let mut working = ResourceState::new(self.schema_version());
        working.set_id(id);
        self.handle.update_state(&mut working, &model, meta.formatter())?;
        self.finish(&mut working, model.id());
        Ok(working)
    }
}
