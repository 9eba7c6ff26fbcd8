// crates/monitor-sync-core/src/runtime/meta.rs
// ============================================================================
// Module: Provider Meta
// Description: Process-scoped collaborators handed to every CRUD call.
// Purpose: Share one REST client and formatter across all resources.
// Dependencies: crate::core::naming, monitor-sync-rest
// ============================================================================

//! Process-scoped collaborators handed to every CRUD call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use monitor_sync_rest::CancellationToken;
use monitor_sync_rest::RequestContext;
use monitor_sync_rest::RestClient;

use crate::core::naming::NameFormatter;

// ============================================================================
// SECTION: Provider Meta
// ============================================================================

/// Shared collaborators built once from provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderMeta {
    /// Shared transport.
    client: RestClient,
    /// Name affixes.
    formatter: NameFormatter,
    /// Deadline applied to each CRUD call.
    default_timeout: Duration,
}

impl ProviderMeta {
    /// Default per-call deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates the provider meta.
    #[must_use]
    pub const fn new(client: RestClient, formatter: NameFormatter, default_timeout: Duration) -> Self {
        Self {
            client,
            formatter,
            default_timeout,
        }
    }

    /// Returns the shared REST client.
    #[must_use]
    pub const fn client(&self) -> &RestClient {
        &self.client
    }

    /// Returns the name formatter.
    #[must_use]
    pub const fn formatter(&self) -> &NameFormatter {
        &self.formatter
    }

    /// Returns the per-call deadline.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Starts a context for one CRUD call using the default deadline.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.default_timeout)
    }

    /// Starts a cancellable context for one CRUD call.
    #[must_use]
    pub fn cancellable_context(&self, token: CancellationToken) -> RequestContext {
        RequestContext::with_cancellation(self.default_timeout, token)
    }
}
