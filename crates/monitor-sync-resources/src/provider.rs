// crates/monitor-sync-resources/src/provider.rs
// ============================================================================
// Module: Provider
// Description: Registry of every managed resource kind.
// Purpose: Route host calls by resource name and build the shared meta.
// Dependencies: crate handles, monitor-sync-config, monitor-sync-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! The provider owns one driver per resource kind behind the object-safe
//! [`Resource`] trait, keyed by resource name. [`Provider::configure`] turns a
//! validated [`ProviderConfig`] into the [`ProviderMeta`] shared by every call.
//! Invariants:
//! - Resource names are unique within the provider.
//! - Configuration is validated before any client is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use monitor_sync_config::ConfigError;
use monitor_sync_config::ProviderConfig;
use monitor_sync_core::ProviderMeta;
use monitor_sync_core::Resource;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::SyncError;
use monitor_sync_core::new_managed_resource;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestError;
use thiserror::Error;
use tracing::info;

use crate::alerting_channel::AlertingChannelHandle;
use crate::api_token::ApiTokenHandle;
use crate::application_alert_config::ApplicationAlertConfigHandle;
use crate::custom_dashboard::CustomDashboardHandle;
use crate::custom_event_specification::CustomEventSpecificationHandle;
use crate::group::GroupHandle;
use crate::synthetic_test::SyntheticTestHandle;
use crate::user_role::UserRoleHandle;
use crate::website_alert_config::WebsiteAlertConfigHandle;
use crate::website_monitoring_config::WebsiteMonitoringConfigHandle;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provider setup and lookup errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The REST client could not be built.
    #[error(transparent)]
    Rest(#[from] RestError),
    /// A handle failed its construction checks.
    #[error(transparent)]
    Resource(#[from] SyncError),
    /// A resource name was registered twice.
    #[error("resource already registered: {0}")]
    Duplicate(String),
    /// No resource is registered under the name.
    #[error("unknown resource {name}; known resources: {known}")]
    Unknown {
        /// Requested name.
        name: String,
        /// Comma separated registered names.
        known: String,
    },
}

// ============================================================================
// SECTION: Provider
// ============================================================================

/// Resource registry.
#[derive(Default)]
pub struct Provider {
    /// Drivers keyed by resource name.
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Provider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with every built-in resource registered.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Duplicate`] when two handles share a name.
    pub fn with_builtin_resources() -> Result<Self, ProviderError> {
        let mut provider = Self::new();
        provider.register(AlertingChannelHandle::new())?;
        provider.register(ApiTokenHandle::new())?;
        provider.register(ApplicationAlertConfigHandle::new())?;
        provider.register(ApplicationAlertConfigHandle::global())?;
        provider.register(CustomDashboardHandle::new())?;
        provider.register(CustomEventSpecificationHandle::new())?;
        provider.register(GroupHandle::new())?;
        provider.register(SyntheticTestHandle::new())?;
        provider.register(UserRoleHandle::new())?;
        provider.register(WebsiteAlertConfigHandle::new())?;
        provider.register(WebsiteMonitoringConfigHandle::new())?;
        Ok(provider)
    }

    /// Registers a handle under its resource name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Duplicate`] when the name is taken, or
    /// [`ProviderError::Resource`] when the handle's upgrader chain is broken.
    pub fn register<H: ResourceHandle + 'static>(&mut self, handle: H) -> Result<(), ProviderError> {
        let name = handle.metadata().name;
        if self.resources.contains_key(name) {
            return Err(ProviderError::Duplicate(name.to_string()));
        }
        let resource = new_managed_resource(handle)?;
        self.resources.insert(name, Box::new(resource));
        Ok(())
    }

    /// Returns the driver registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unknown`] listing the registered names.
    pub fn resource(&self, name: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources.get(name).map(|resource| &**resource).ok_or_else(|| ProviderError::Unknown {
            name: name.to_string(),
            known: self.names().join(", "),
        })
    }

    /// Returns the registered resource names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Validates `config` and builds the collaborators shared by every call.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the configuration is invalid or the
    /// HTTP client cannot be created.
    pub fn configure(&self, config: &ProviderConfig) -> Result<ProviderMeta, ProviderError> {
        config.validate()?;
        let client = RestClient::new(config.rest_config())?;
        info!(
            endpoint = config.endpoint(),
            resources = self.resources.len(),
            "provider configured"
        );
        Ok(ProviderMeta::new(client, config.formatter(), config.request_timeout()))
    }
}
