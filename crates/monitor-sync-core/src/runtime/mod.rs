// crates/monitor-sync-core/src/runtime/mod.rs
// ============================================================================
// Module: Monitor Sync Runtime
// Description: CRUD driver and shared provider collaborators.
// Purpose: Execute lifecycle operations on behalf of the host orchestrator.
// Dependencies: crate::core, crate::interfaces, monitor-sync-rest
// ============================================================================

//! CRUD driver and shared provider collaborators.

pub mod driver;
pub mod meta;

pub use driver::ManagedResource;
pub use driver::new_managed_resource;
pub use meta::ProviderMeta;
