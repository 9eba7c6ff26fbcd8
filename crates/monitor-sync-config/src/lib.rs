// crates/monitor-sync-config/src/lib.rs
// ============================================================================
// Module: Monitor Sync Config Library
// Description: Provider configuration model, validation, and logging setup.
// Purpose: Single source of truth for monitor-sync.toml semantics.
// Dependencies: monitor-sync-core, monitor-sync-rest, serde, toml, tracing-subscriber
// ============================================================================

//! ## Overview
//! `monitor-sync-config` defines [`ProviderConfig`], loaded from TOML with
//! environment fallbacks for credentials, and converts it into the REST
//! client settings, name formatter, and call deadline the engine needs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod logging;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use logging::effective_filter;
pub use logging::init_logging;
