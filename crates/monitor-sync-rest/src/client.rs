// crates/monitor-sync-rest/src/client.rs
// ============================================================================
// Module: REST Client
// Description: Authenticated blocking HTTP client for the remote API.
// Purpose: Send requests with retries, deadlines, and error classification.
// Dependencies: reqwest, tracing
// ============================================================================

//! ## Overview
//! [`RestClient`] owns one connection pool and the API token. Every call runs
//! through [`RestClient::execute`], which classifies the response:
//! - 2xx returns the raw body (possibly empty).
//! - 404 returns [`RestError::NotFound`] without retrying.
//! - 429 waits for `Retry-After` (or backoff) and retries.
//! - 5xx and transport failures back off and retry.
//! - Any other status fails immediately with [`RestError::Client`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::RETRY_AFTER;
use tracing::debug;
use tracing::warn;

use crate::context::RequestContext;
use crate::error::RestError;
use crate::retry::RetryPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type used for request and response bodies.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = concat!("monitor-sync/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Settings used to build a [`RestClient`].
///
/// # Invariants
/// - `endpoint` is a host name, optionally with scheme and port. Without a
///   scheme, `https` is assumed.
/// - `api_token` is sent verbatim after the `apiToken` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestClientConfig {
    /// API host, for example `tenant-unit.example.io`.
    pub endpoint: String,
    /// API token used for authentication.
    pub api_token: String,
    /// Accept invalid TLS certificates.
    pub tls_skip_verify: bool,
    /// Retry settings.
    pub retry: RetryPolicy,
    /// User agent header value.
    pub user_agent: String,
}

impl RestClientConfig {
    /// Creates a configuration with default retry and TLS settings.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            tls_skip_verify: false,
            retry: RetryPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Request Description
// ============================================================================

/// One logical request, independent of retries.
#[derive(Debug, Clone)]
pub struct RestRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Collection path, for example `/api/settings/roles`.
    pub path: &'a str,
    /// Optional entity id appended as an escaped path segment.
    pub id: Option<&'a str>,
    /// Query parameters.
    pub query: Vec<(&'a str, &'a str)>,
    /// JSON body.
    pub body: Option<Vec<u8>>,
}

impl<'a> RestRequest<'a> {
    /// Creates a request without id, query, or body.
    #[must_use]
    pub const fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            id: None,
            query: Vec::new(),
            body: None,
        }
    }

    /// Targets a single entity.
    #[must_use]
    pub fn with_id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &'a str, value: &'a str) -> Self {
        self.query.push((key, value));
        self
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Authenticated client shared by all resources of one provider.
#[derive(Debug, Clone)]
pub struct RestClient {
    /// Underlying blocking HTTP client.
    http: Client,
    /// Scheme, host, and port of the API.
    base_url: Url,
    /// Value of the `Authorization` header.
    authorization: String,
    /// Retry settings.
    retry: RetryPolicy,
}

/// Result of one attempt.
enum Attempt {
    /// The call finished with a body.
    Done(Vec<u8>),
    /// The call failed for good.
    Fatal(RestError),
    /// The call may be retried after an optional server-requested wait.
    Retry(RestError, Option<Duration>),
}

impl RestClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    /// Returns [`RestError::Config`] when the endpoint is not a valid host or
    /// the HTTP client cannot be created.
    pub fn new(config: RestClientConfig) -> Result<Self, RestError> {
        let base_url = parse_endpoint(&config.endpoint)?;
        if config.api_token.trim().is_empty() {
            return Err(RestError::Config("api token must not be empty".to_string()));
        }
        if config.retry.max_attempts == 0 {
            return Err(RestError::Config("retry attempts must be at least 1".to_string()));
        }
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()
            .map_err(|err| RestError::Config(format!("http client build failed: {err}")))?;
        Ok(Self {
            http,
            base_url,
            authorization: format!("apiToken {}", config.api_token),
            retry: config.retry,
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the retry settings.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Sends a request, retrying transient failures within the context deadline.
    ///
    /// Returns the response body, which is empty when the remote sent none.
    ///
    /// # Errors
    /// Returns [`RestError`] per the classification in the module docs, or
    /// [`RestError::Cancelled`] / [`RestError::Timeout`] from the context.
    pub fn execute(
        &self,
        request: &RestRequest<'_>,
        ctx: &RequestContext,
    ) -> Result<Vec<u8>, RestError> {
        let url = self.url_for(request)?;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let remaining = ctx.check()?;
            debug!(method = %request.method, url = %url, attempt, "sending request");
            let outcome = self.attempt(request, &url, remaining);
            let (error, requested_wait) = match outcome {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retry(error, wait) => (error, wait),
            };
            if attempt >= self.retry.max_attempts {
                warn!(method = %request.method, url = %url, attempt, error = %error, "giving up");
                return Err(error);
            }
            let wait = requested_wait.unwrap_or_else(|| self.retry.backoff(attempt));
            warn!(
                method = %request.method,
                url = %url,
                attempt,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "retrying request"
            );
            ctx.sleep(wait)?;
        }
    }

    /// Performs a single attempt bounded by `remaining`.
    fn attempt(&self, request: &RestRequest<'_>, url: &Url, remaining: Duration) -> Attempt {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(AUTHORIZATION, self.authorization.as_str())
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .timeout(remaining);
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, JSON_MEDIA_TYPE).body(body.clone());
        }
        match builder.send() {
            Ok(response) => self.classify(response),
            Err(err) if err.is_timeout() => Attempt::Fatal(RestError::Timeout),
            Err(err) => Attempt::Retry(RestError::Transport(err.to_string()), None),
        }
    }

    /// Maps a response to an attempt outcome.
    fn classify(&self, response: Response) -> Attempt {
        let status = response.status();
        if status.is_success() {
            return match response.bytes() {
                Ok(bytes) => Attempt::Done(bytes.to_vec()),
                Err(err) => Attempt::Retry(RestError::Transport(err.to_string()), None),
            };
        }
        if status == StatusCode::NOT_FOUND {
            return Attempt::Fatal(RestError::NotFound);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = RetryPolicy::retry_after(
                response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            );
            let message = response_message(status, response);
            return Attempt::Retry(RestError::RateLimited(message), wait);
        }
        let code = status.as_u16();
        let message = response_message(status, response);
        if status.is_server_error() {
            Attempt::Retry(RestError::Server { status: code, message }, None)
        } else {
            Attempt::Fatal(RestError::Client { status: code, message })
        }
    }

    /// Resolves the full URL of a request.
    fn url_for(&self, request: &RestRequest<'_>) -> Result<Url, RestError> {
        let mut url = self
            .base_url
            .join(request.path)
            .map_err(|err| RestError::Config(format!("invalid path {}: {err}", request.path)))?;
        if let Some(id) = request.id {
            url.path_segments_mut()
                .map_err(|()| RestError::Config("endpoint cannot carry a path".to_string()))?
                .pop_if_empty()
                .push(id);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter().copied());
        }
        Ok(url)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses the configured endpoint into a base URL.
fn parse_endpoint(endpoint: &str) -> Result<Url, RestError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RestError::Config("endpoint must not be empty".to_string()));
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate)
        .map_err(|err| RestError::Config(format!("invalid endpoint {endpoint}: {err}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(RestError::Config(format!("unsupported scheme {other}"))),
    }
    if url.host_str().is_none() {
        return Err(RestError::Config(format!("endpoint {endpoint} has no host")));
    }
    Ok(url)
}

/// Extracts a readable message from an error response.
fn response_message(status: StatusCode, response: Response) -> String {
    let body = response.text().unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        body.to_string()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
