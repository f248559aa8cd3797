//! Streamable-HTTP transport in JSON-response mode.
//!
//! One [`SessionTransport`] exists per session. It frames JSON-RPC messages
//! carried by HTTP requests, hands them to the connected [`McpServer`] and
//! tracks activity so idle sessions can be expired.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::debug;

use crate::mcp::protocol::{McpError, McpRequest, McpResponse, RequestId, JSONRPC_VERSION};
use crate::mcp::McpServer;

pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport for session {0} has no connected server")]
    NotConnected(String),
    #[error("transport for session {0} is already connected")]
    AlreadyConnected(String),
}

pub struct SessionTransport {
    session_id: String,
    server: OnceLock<Arc<McpServer>>,
    last_activity: Mutex<Instant>,
    closed: AtomicBool,
    close_signal: Notify,
}

/// What a single inbound JSON-RPC message turned into.
enum Outcome {
    Reply(McpResponse),
    Silent,
}

impl SessionTransport {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            server: OnceLock::new(),
            last_activity: Mutex::new(Instant::now()),
            closed: AtomicBool::new(false),
            close_signal: Notify::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn connect(&self, server: Arc<McpServer>) -> Result<(), TransportError> {
        self.server
            .set(server)
            .map_err(|_| TransportError::AlreadyConnected(self.session_id.clone()))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Transport for session {} closed", self.session_id);
            self.close_signal.notify_one();
        }
    }

    /// Resolves once the transport has been closed.
    pub async fn closed(&self) {
        while !self.is_closed() {
            self.close_signal.notified().await;
        }
    }

    pub fn idle_for(&self) -> Duration {
        match self.last_activity.lock() {
            Ok(last) => last.elapsed(),
            Err(poisoned) => poisoned.into_inner().elapsed(),
        }
    }

    fn touch(&self) {
        match self.last_activity.lock() {
            Ok(mut last) => *last = Instant::now(),
            Err(poisoned) => *poisoned.into_inner() = Instant::now(),
        }
    }

    pub async fn handle_request(
        &self,
        method: &Method,
        body: Bytes,
    ) -> Result<Response, TransportError> {
        if self.is_closed() {
            return Ok(session_not_found_response());
        }
        self.touch();

        let response = if method == Method::POST {
            self.handle_post(body).await?
        } else if method == Method::DELETE {
            self.close();
            StatusCode::OK.into_response()
        } else {
            // Server-initiated streams are never offered.
            (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "POST, DELETE")],
            )
                .into_response()
        };

        Ok(self.with_session_header(response))
    }

    async fn handle_post(&self, body: Bytes) -> Result<Response, TransportError> {
        let server = self
            .server
            .get()
            .ok_or_else(|| TransportError::NotConnected(self.session_id.clone()))?;

        let payload: Value = match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    McpError::ParseError(e.to_string()),
                ))
            }
        };

        match payload {
            Value::Array(messages) => {
                if messages.is_empty() {
                    return Ok(error_response(
                        StatusCode::BAD_REQUEST,
                        McpError::InvalidRequest("empty batch".to_string()),
                    ));
                }

                let mut replies = Vec::new();
                for message in messages {
                    if let Outcome::Reply(reply) = dispatch(server, message).await {
                        replies.push(reply);
                    }
                }

                if replies.is_empty() {
                    Ok(StatusCode::ACCEPTED.into_response())
                } else {
                    Ok((StatusCode::OK, Json(replies)).into_response())
                }
            }
            message @ Value::Object(_) => Ok(match dispatch(server, message).await {
                Outcome::Reply(reply) if reply.error.is_some() && reply.id.is_none() => {
                    (StatusCode::BAD_REQUEST, Json(reply)).into_response()
                }
                Outcome::Reply(reply) => (StatusCode::OK, Json(reply)).into_response(),
                Outcome::Silent => StatusCode::ACCEPTED.into_response(),
            }),
            _ => Ok(error_response(
                StatusCode::BAD_REQUEST,
                McpError::InvalidRequest("expected a JSON-RPC object or batch".to_string()),
            )),
        }
    }

    fn with_session_header(&self, mut response: Response) -> Response {
        if let Ok(value) = HeaderValue::from_str(&self.session_id) {
            response.headers_mut().insert(SESSION_HEADER, value);
        }
        response
    }
}

async fn dispatch(server: &McpServer, message: Value) -> Outcome {
    let Value::Object(ref fields) = message else {
        return Outcome::Reply(McpResponse::error(
            None,
            McpError::InvalidRequest("expected a JSON-RPC object".to_string()),
        ));
    };

    // Responses to server-initiated requests; this server never sends any.
    if !fields.contains_key("method")
        && (fields.contains_key("result") || fields.contains_key("error"))
    {
        return Outcome::Silent;
    }

    let id = fields
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

    let request: McpRequest = match serde_json::from_value(message) {
        Ok(request) => request,
        Err(e) => {
            return Outcome::Reply(McpResponse::error(
                id,
                McpError::InvalidRequest(e.to_string()),
            ))
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        if request.is_notification() {
            return Outcome::Silent;
        }
        return Outcome::Reply(McpResponse::error(
            request.id,
            McpError::InvalidRequest(format!("unsupported jsonrpc version {}", request.jsonrpc)),
        ));
    }

    match server.handle_request(request).await {
        Some(reply) => Outcome::Reply(reply),
        None => Outcome::Silent,
    }
}

fn error_response(status: StatusCode, error: McpError) -> Response {
    (status, Json(McpResponse::error(None, error))).into_response()
}

pub fn session_not_found_response() -> Response {
    error_response(StatusCode::NOT_FOUND, McpError::SessionNotFound)
}

/// The fixed body returned whenever request handling fails without a response.
pub fn internal_error_response() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal server error"},"id":null}"#,
        ))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tools::register_all_tools;
    use crate::mcp::McpRegistry;
    use crate::websets::testing::RecordingApi;
    use serde_json::json;

    fn connected(session_id: &str) -> SessionTransport {
        let mut registry = McpRegistry::new();
        register_all_tools(&mut registry);
        let server = McpServer::new(
            session_id,
            Arc::new(registry),
            Arc::new(RecordingApi::ok()),
        );
        let transport = SessionTransport::new(session_id);
        transport.connect(Arc::new(server)).unwrap();
        transport
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_body(value: Value) -> Bytes {
        Bytes::from(serde_json::to_vec(&value).unwrap())
    }

    #[tokio::test]
    async fn test_request_gets_json_reply_with_session_header() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(
                &Method::POST,
                post_body(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[SESSION_HEADER], "s-1");
        let body = body_json(response).await;
        assert_eq!(body, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(
                &Method::POST,
                post_body(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(&Method::POST, Bytes::from_static(b"{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_envelopes() {
        let transport = connected("s-1");
        for payload in [json!([]), json!("ping"), json!({"jsonrpc": "2.0", "id": 3})] {
            let response = transport
                .handle_request(&Method::POST, post_body(payload))
                .await
                .unwrap();
            let status = response.status();
            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], -32600, "{}", body);
            assert!(status == StatusCode::BAD_REQUEST || status == StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_batch_replies_only_to_requests() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(
                &Method::POST,
                post_body(json!([
                    {"jsonrpc": "2.0", "id": 1, "method": "ping"},
                    {"jsonrpc": "2.0", "method": "notifications/initialized"},
                    {"jsonrpc": "2.0", "id": 2, "method": "ping"}
                ])),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|reply| reply["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_client_responses_are_ignored() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(
                &Method::POST,
                post_body(json!({"jsonrpc": "2.0", "id": 9, "result": {}})),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(&Method::GET, Bytes::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_delete_closes_and_later_requests_are_rejected() {
        let transport = connected("s-1");
        let response = transport
            .handle_request(&Method::DELETE, Bytes::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(transport.is_closed());

        // Already closed, so this resolves immediately.
        transport.closed().await;

        let response = transport
            .handle_request(
                &Method::POST,
                post_body(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], -32001);
    }

    #[tokio::test]
    async fn test_unconnected_transport_fails() {
        let transport = SessionTransport::new("orphan");
        let result = transport
            .handle_request(
                &Method::POST,
                post_body(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})),
            )
            .await;
        assert!(matches!(result, Err(TransportError::NotConnected(_))));
    }

    #[tokio::test]
    async fn test_internal_error_body_is_fixed() {
        let response = internal_error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32603, "message": "Internal server error"},
                "id": null
            })
        );
    }
}
