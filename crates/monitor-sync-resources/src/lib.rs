// crates/monitor-sync-resources/src/lib.rs
// ============================================================================
// Module: Monitor Sync Resources
// Description: Entity handles for the monitoring platform and their registry.
// Purpose: Bind each remote entity kind to its schema, wire model, and path.
// Dependencies: monitor-sync-config, monitor-sync-core, monitor-sync-rest, serde, tag-filter
// ============================================================================

//! ## Overview
//! Each module defines one entity kind: its REST path, its serde wire model,
//! its persisted [`Schema`](monitor_sync_core::Schema), and a
//! [`ResourceHandle`](monitor_sync_core::ResourceHandle) translating between
//! the two. [`shared`] holds the cross-cutting tables (severity, thresholds,
//! custom payload fields, permission flags, tag filters) and [`provider`]
//! registers every handle behind the generic CRUD driver.
//! Invariants:
//! - `map_state_to_model(update_state(model)) == model` for every handle.
//! - Exactly one sibling block of a variant axis is populated after a read.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod alerting_channel;
pub mod api_token;
pub mod application_alert_config;
pub mod custom_dashboard;
pub mod custom_event_specification;
pub mod group;
pub mod provider;
pub mod shared;
pub mod user_role;
pub mod website_alert_config;
pub mod website_monitoring_config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use alerting_channel::AlertingChannelHandle;
pub use api_token::ApiTokenHandle;
pub use application_alert_config::ApplicationAlertConfigHandle;
pub use custom_dashboard::CustomDashboardHandle;
pub use custom_event_specification::CustomEventSpecificationHandle;
pub use group::GroupHandle;
pub use provider::Provider;
pub use provider::ProviderError;
pub use synthetic_test::SyntheticTestHandle;
pub use user_role::UserRoleHandle;
pub use website_alert_config::WebsiteAlertConfigHandle;
pub use website_monitoring_config::WebsiteMonitoringConfigHandle;
