// crates/monitor-sync-config/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Installs the global tracing subscriber from configuration.
// Purpose: Route engine and transport events to stderr in plain or JSON form.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` overrides the configured filter when set. Installation is
//! idempotent from the caller's point of view: a second call reports
//! [`ConfigError::Logging`] and leaves the first subscriber in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;

use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;
use crate::config::LogFormat;
use crate::config::LoggingConfig;

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Returns the effective filter: `RUST_LOG` when set, the config otherwise.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the configured directive is invalid.
pub fn effective_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => config.env_filter(),
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`ConfigError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = effective_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);
    let installed = match config.format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| ConfigError::Logging(err.to_string()))
}
