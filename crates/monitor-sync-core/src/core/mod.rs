// crates/monitor-sync-core/src/core/mod.rs
// ============================================================================
// Module: Monitor Sync Core Types
// Description: Schema, state, naming, variants, canonical JSON, and migration.
// Purpose: Provide the building blocks every resource handle is written with.
// Dependencies: serde_json, serde_jcs, tag-filter
// ============================================================================

//! Schema, state, naming, variants, canonical JSON, and migration.

pub mod canonical;
pub mod error;
pub mod migration;
pub mod naming;
pub mod schema;
pub mod state;
pub mod variant;

pub use error::ErrorKind;
pub use error::SyncError;
pub use migration::StateUpgrader;
pub use naming::NameFormatter;
pub use schema::Cardinality;
pub use schema::Element;
pub use schema::Field;
pub use schema::FieldType;
pub use schema::Schema;
pub use schema::ValueType;
pub use schema::Validator;
pub use state::BlockView;
pub use state::Fields;
pub use state::ResourceState;
pub use variant::VariantAxis;
