// crates/monitor-sync-config/src/config.rs
// ============================================================================
// Module: Provider Configuration
// Description: Configuration loading and validation for the provider.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: monitor-sync-core, monitor-sync-rest, serde, toml, tracing
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The endpoint and API token may be omitted from the file and supplied
//! through environment variables instead. Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use monitor_sync_core::NameFormatter;
use monitor_sync_rest::RestClientConfig;
use monitor_sync_rest::RetryPolicy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "monitor-sync.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MONITOR_SYNC_CONFIG";
/// Environment variable supplying the endpoint when the file omits it.
pub const ENDPOINT_ENV_VAR: &str = "MONITOR_SYNC_ENDPOINT";
/// Environment variable supplying the API token when the file omits it.
pub const API_TOKEN_ENV_VAR: &str = "MONITOR_SYNC_API_TOKEN";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Suffix appended to managed names unless configured otherwise.
pub const DEFAULT_NAME_SUFFIX: &str = " (TF managed)";
/// Default per-call deadline in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Maximum per-call deadline in seconds.
pub(crate) const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
/// Maximum attempts per call.
pub(crate) const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Maximum initial backoff in milliseconds.
pub(crate) const MAX_INITIAL_BACKOFF_MS: u64 = 60_000;
/// Maximum length of name affixes.
pub(crate) const MAX_NAME_AFFIX_LENGTH: usize = 256;

// ============================================================================
// SECTION: Provider Config
// ============================================================================

/// Provider configuration.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API host, with an optional `http://` or `https://` scheme.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API token.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    /// Prefix applied to managed names.
    #[serde(default)]
    pub default_name_prefix: String,
    /// Suffix applied to managed names.
    #[serde(default = "default_name_suffix")]
    pub default_name_suffix: String,
    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub tls_skip_verify: bool,
    /// Deadline for one CRUD call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            default_name_prefix: String::new(),
            default_name_suffix: default_name_suffix(),
            tls_skip_verify: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("default_name_prefix", &self.default_name_prefix)
            .field("default_name_suffix", &self.default_name_suffix)
            .field("tls_skip_verify", &self.tls_skip_verify)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry", &self.retry)
            .field("logging", &self.logging)
            .finish()
    }
}

impl ProviderConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        debug!(path = %resolved.display(), "loading provider config");
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates an in-memory TOML document, reading omitted
    /// credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_toml_str_with_env(content, |name| env::var(name).ok())
    }

    /// Parses and validates a TOML document with an explicit environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str_with_env(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_fallbacks(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Fills a missing endpoint or token from the environment.
    pub fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.endpoint.as_deref().is_none_or(|value| value.trim().is_empty()) {
            self.endpoint = lookup(ENDPOINT_ENV_VAR);
        }
        if self.api_token.as_deref().is_none_or(|value| value.trim().is_empty()) {
            self.api_token = lookup(API_TOKEN_ENV_VAR);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint().trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be set in the config file or {ENDPOINT_ENV_VAR}"
            )));
        }
        if endpoint.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid("endpoint must not contain whitespace".to_string()));
        }
        if self.api_token().trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "api_token must be set in the config file or {API_TOKEN_ENV_VAR}"
            )));
        }
        if self.default_name_prefix.len() > MAX_NAME_AFFIX_LENGTH
            || self.default_name_suffix.len() > MAX_NAME_AFFIX_LENGTH
        {
            return Err(ConfigError::Invalid("name affixes exceed max length".to_string()));
        }
        if !(1 ..= MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ConfigError::Invalid(format!(
                "request_timeout_secs must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }
        self.retry.validate()?;
        self.logging.validate()
    }

    /// Returns the configured endpoint or an empty string.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or_default()
    }

    /// Returns the configured API token or an empty string.
    #[must_use]
    pub fn api_token(&self) -> &str {
        self.api_token.as_deref().unwrap_or_default()
    }

    /// Builds the REST client settings.
    #[must_use]
    pub fn rest_config(&self) -> RestClientConfig {
        let mut config = RestClientConfig::new(self.endpoint().trim(), self.api_token().trim());
        config.tls_skip_verify = self.tls_skip_verify;
        config.retry = self.retry.policy();
        config
    }

    /// Builds the name formatter.
    #[must_use]
    pub fn formatter(&self) -> NameFormatter {
        NameFormatter::new(self.default_name_prefix.as_str(), self.default_name_suffix.as_str())
    }

    /// Returns the per-call deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// SECTION: Retry Config
// ============================================================================

/// Retry settings for transient failures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wait after the first failed attempt, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for any single wait, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryConfig {
    /// Validates retry bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_RETRY_ATTEMPTS).contains(&self.max_attempts) {
            return Err(ConfigError::Invalid(format!(
                "retry.max_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}"
            )));
        }
        if !(1 ..= MAX_INITIAL_BACKOFF_MS).contains(&self.initial_backoff_ms) {
            return Err(ConfigError::Invalid(format!(
                "retry.initial_backoff_ms must be between 1 and {MAX_INITIAL_BACKOFF_MS}"
            )));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.max_backoff_ms must be >= retry.initial_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Converts into the transport retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

// ============================================================================
// SECTION: Logging Config
// ============================================================================

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Env-filter directive, for example `info,monitor_sync_rest=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    /// Validates the filter directive.
    fn validate(&self) -> Result<(), ConfigError> {
        self.env_filter().map(|_| ())
    }

    /// Parses the filter directive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the directive does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(self.filter.trim())
            .map_err(|err| ConfigError::Invalid(format!("logging.filter is invalid: {err}")))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Logging could not be installed.
    #[error("logging setup error: {0}")]
    Logging(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serde default for `default_name_suffix`.
fn default_name_suffix() -> String {
    DEFAULT_NAME_SUFFIX.to_string()
}

/// Serde default for `request_timeout_secs`.
const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Serde default for `retry.max_attempts`.
const fn default_max_attempts() -> u32 {
    3
}

/// Serde default for `retry.initial_backoff_ms`.
const fn default_initial_backoff_ms() -> u64 {
    250
}

/// Serde default for `retry.max_backoff_ms`.
const fn default_max_backoff_ms() -> u64 {
    10_000
}

/// Serde default for `logging.filter`.
fn default_log_filter() -> String {
    "info".to_string()
}

/// Resolves the config path from an explicit path or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
