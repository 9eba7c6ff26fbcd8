// crates/monitor-sync-core/src/lib.rs
// ============================================================================
// Module: Monitor Sync Core
// Description: Resource synchronization engine shared by every entity kind.
// Purpose: Reconcile desired state with remote records through typed handles.
// Dependencies: monitor-sync-rest, serde_json, serde_jcs, tag-filter, tracing, uuid
// ============================================================================

//! ## Overview
//! The engine converts between two shapes of the same entity: the state the
//! host orchestrator stores, validated by a [`Schema`], and the remote JSON
//! record fetched through the REST client.
//! - [`core`] holds the building blocks: schema, state, name formatter,
//!   variant axes, canonical JSON, and state migration.
//! - [`interfaces`] defines [`ResourceHandle`] and the object-safe
//!   [`Resource`] surface.
//! - [`runtime`] provides the generic CRUD driver and [`ProviderMeta`].

pub mod core;
pub mod interfaces;
pub mod runtime;

pub use crate::core::BlockView;
pub use crate::core::Cardinality;
pub use crate::core::Element;
pub use crate::core::ErrorKind;
pub use crate::core::Field;
pub use crate::core::FieldType;
pub use crate::core::Fields;
pub use crate::core::NameFormatter;
pub use crate::core::ResourceState;
pub use crate::core::Schema;
pub use crate::core::StateUpgrader;
pub use crate::core::SyncError;
pub use crate::core::Validator;
pub use crate::core::ValueType;
pub use crate::core::VariantAxis;
pub use crate::interfaces::Resource;
pub use crate::interfaces::ResourceHandle;
pub use crate::interfaces::ResourceMetadata;
pub use crate::runtime::ManagedResource;
pub use crate::runtime::ProviderMeta;
pub use crate::runtime::new_managed_resource;
