// crates/monitor-sync-core/tests/common/mod.rs
// ============================================================================
// Module: Driver Test Support
// Description: Scripted in-process HTTP server for driver tests.
// Purpose: Record requests and replay canned responses.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! [`ScriptedServer`] answers requests with a fixed list of responses, in
//! order, and returns what it received once the test finishes.
//! [`provider_meta`] builds the shared collaborators pointed at it.

#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "Shared helpers panic on setup failure; not every test uses every helper."
)]

use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use monitor_sync_core::NameFormatter;
use monitor_sync_core::ProviderMeta;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestClientConfig;
use monitor_sync_rest::RetryPolicy;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request observed by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Path and query.
    pub url: String,
    /// Header pairs, names lowercased.
    pub headers: Vec<(String, String)>,
    /// Raw body text.
    pub body: String,
}

impl RecordedRequest {
    /// Returns the first header with the given lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Canned response.
#[derive(Debug, Clone)]
pub struct Scripted {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
}

impl Scripted {
    /// Response with a JSON body.
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    /// Response without body.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Server replaying [`Scripted`] responses.
pub struct ScriptedServer {
    /// `http://127.0.0.1:<port>`.
    pub endpoint: String,
    /// Worker collecting requests.
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl ScriptedServer {
    /// Starts a server that answers `responses.len()` requests.
    pub fn start(responses: Vec<Scripted>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for scripted in responses {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(5)) else {
                    break;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string().to_ascii_lowercase(), h.value.to_string()))
                        .collect(),
                    body,
                });
                let mut response =
                    Response::from_string(scripted.body).with_status_code(scripted.status);
                for (name, value) in &scripted.headers {
                    response.add_header(
                        Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap(),
                    );
                }
                let _ = request.respond(response);
            }
            recorded
        });
        Self {
            endpoint: format!("http://{addr}"),
            handle,
        }
    }

    /// Waits for the worker and returns the recorded requests.
    pub fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().unwrap()
    }
}

/// Builds provider meta with fast retries against `endpoint`.
pub fn provider_meta(endpoint: &str, prefix: &str, suffix: &str) -> ProviderMeta {
    let mut config = RestClientConfig::new(endpoint, "test-token");
    config.retry = RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
    };
    ProviderMeta::new(
        RestClient::new(config).unwrap(),
        NameFormatter::new(prefix, suffix),
        Duration::from_secs(10),
    )
}
