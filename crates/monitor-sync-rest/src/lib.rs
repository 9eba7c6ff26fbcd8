// crates/monitor-sync-rest/src/lib.rs
// ============================================================================
// Module: Monitor Sync REST
// Description: Shared HTTP transport and typed resource clients.
// Purpose: Talk to the remote monitoring API with retries and deadlines.
// Dependencies: reqwest, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! One [`RestClient`] is created per process from the provider
//! configuration and shared by every resource. A [`RestResource`] binds the
//! client to an API path and an entity type, exposing `get_one`, `get_all`,
//! `create`, `update`, and `delete_by_id`.
//! Invariants:
//! - Every request carries `Authorization: apiToken <token>` and JSON
//!   `Accept` / `Content-Type` headers.
//! - 5xx responses, transport failures, and 429 are retried; other 4xx fail
//!   immediately; 404 maps to [`RestError::NotFound`].
//! - All attempts of one call share the [`RequestContext`] deadline and stop
//!   when its cancellation token fires.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod context;
pub mod error;
pub mod resource;
pub mod retry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::RestClient;
pub use client::RestClientConfig;
pub use context::CancellationToken;
pub use context::RequestContext;
pub use error::RestError;
pub use resource::RestMode;
pub use resource::RestObject;
pub use resource::RestResource;
pub use retry::RetryPolicy;
