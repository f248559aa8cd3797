//! MCP client for end-to-end tests
//!
//! Speaks JSON-RPC over the `/message` endpoint and keeps track of the
//! session id handed out by the server.
//!
//! When the wire format changes, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Outcome of a `tools/call`, flattened to what tests assert on
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub is_error: bool,
    pub text: String,
}

impl ToolOutcome {
    /// Parses the text block as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("Tool output is not JSON ({}): {}", e, self.text))
    }
}

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    session_id: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl TestClient {
    /// Creates a client with no session yet
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            session_id: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a client that already completed the initialize handshake
    ///
    /// # Panics
    ///
    /// Panics if initialize fails (indicates test infrastructure problem).
    pub async fn initialized(base_url: String) -> Self {
        let client = Self::new(base_url);
        let response = client.initialize().await;
        assert!(
            response.get("result").is_some(),
            "initialize failed: {}",
            response
        );
        client.notify("notifications/initialized").await;
        client
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().unwrap().clone()
    }

    pub fn set_session_id(&self, session_id: Option<String>) {
        *self.session_id.lock().unwrap() = session_id;
    }

    fn mcp_url(&self) -> String {
        format!("{}{}", self.base_url, MCP_PATH)
    }

    // ========================================================================
    // Raw HTTP
    // ========================================================================

    /// POSTs a raw body, attaching the current session id if any
    pub async fn post_raw(&self, body: impl Into<reqwest::Body>) -> Response {
        let mut request = self
            .client
            .post(self.mcp_url())
            .header("content-type", "application/json")
            .header("accept", "application/json, text/event-stream")
            .body(body);
        if let Some(id) = self.session_id() {
            request = request.header(SESSION_HEADER, id);
        }
        request.send().await.expect("MCP request failed")
    }

    pub async fn post_json(&self, body: &Value) -> Response {
        self.post_raw(body.to_string()).await
    }

    pub async fn get(&self) -> Response {
        let mut request = self.client.get(self.mcp_url());
        if let Some(id) = self.session_id() {
            request = request.header(SESSION_HEADER, id);
        }
        request.send().await.expect("GET request failed")
    }

    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// Terminates the current session
    pub async fn delete_session(&self) -> Response {
        let mut request = self.client.delete(self.mcp_url());
        if let Some(id) = self.session_id() {
            request = request.header(SESSION_HEADER, id);
        }
        request.send().await.expect("DELETE request failed")
    }

    // ========================================================================
    // JSON-RPC
    // ========================================================================

    /// Sends a request and returns the parsed response envelope
    pub async fn rpc(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let response = self.post_json(&body).await;
        let header_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if header_id.is_some() {
            self.set_session_id(header_id);
        }
        response.json().await.expect("Response is not JSON")
    }

    /// Sends a notification, expecting 202 with no body
    pub async fn notify(&self, method: &str) {
        let body = json!({ "jsonrpc": "2.0", "method": method });
        let response = self.post_json(&body).await;
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    }

    pub async fn initialize(&self) -> Value {
        self.rpc(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "e2e-tests", "version": "0.0.0" }
            }),
        )
        .await
    }

    /// Names of every tool the server advertises
    pub async fn list_tools(&self) -> Vec<String> {
        let response = self.rpc("tools/list", json!({})).await;
        response["result"]["tools"]
            .as_array()
            .unwrap_or_else(|| panic!("tools/list failed: {}", response))
            .iter()
            .filter_map(|tool| tool["name"].as_str().map(str::to_string))
            .collect()
    }

    /// Calls a tool, panicking on protocol-level errors
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolOutcome {
        let response = self
            .rpc("tools/call", json!({ "name": name, "arguments": arguments }))
            .await;
        let result = response
            .get("result")
            .unwrap_or_else(|| panic!("tools/call {} failed: {}", name, response));
        let text = result["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        ToolOutcome {
            is_error: result["isError"].as_bool().unwrap_or(false),
            text,
        }
    }
}
