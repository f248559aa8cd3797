//! Fake Websets API
//!
//! An axum app standing in for the upstream API. It records every request
//! and answers with plausible JSON derived from the path, so tool calls can be
//! verified without network access.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use super::constants::UPSTREAM_PREFIX;

/// Path segments naming a collection of resources.
const COLLECTIONS: &[&str] = &[
    "websets",
    "searches",
    "enrichments",
    "items",
    "monitors",
    "runs",
    "webhooks",
    "attempts",
    "events",
];

/// One request as seen by the fake upstream
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to the API root, e.g. `/v0/websets/ws_1`
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub accept: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    requests: Mutex<Vec<RecordedRequest>>,
    forced: Mutex<Option<(StatusCode, String)>>,
    next_id: AtomicUsize,
}

pub struct FakeUpstream {
    /// Base URL to configure the server with (includes the API prefix)
    pub base_url: String,
    state: Arc<FakeState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}{}", port, UPSTREAM_PREFIX),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Every following request gets this status and raw body.
    pub fn respond_with(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("Invalid status code");
        *self.state.forced.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("Fake upstream received no requests")
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(UPSTREAM_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        api_key: header("x-api-key"),
        accept: header("accept"),
        body: body.clone(),
    });

    if let Some((status, raw)) = state.forced.lock().unwrap().clone() {
        return (status, [("content-type", "application/json")], raw).into_response();
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.last().copied().unwrap_or_default();
    let is_collection = COLLECTIONS.contains(&last);

    let reply = if method == Method::GET && is_collection {
        json!({ "data": [], "hasMore": false, "nextCursor": null })
    } else if method == Method::POST && is_collection {
        let n = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let object = last.trim_end_matches("es").trim_end_matches('s');
        json!({
            "id": format!("{}_{}", object, n),
            "object": object,
            "status": "created",
            "request": body
        })
    } else if method == Method::POST && last == "cancel" {
        let id = segments.iter().rev().nth(1).copied().unwrap_or_default();
        json!({ "id": id, "status": "canceled" })
    } else if method == Method::POST && last == "preview" {
        json!({ "search": body.and_then(|b| b.get("search").cloned()), "items": [] })
    } else if method == Method::GET {
        json!({ "id": last, "status": "idle" })
    } else if method == Method::DELETE {
        json!({ "id": last, "deleted": true })
    } else {
        json!({ "id": last, "updated": body })
    };

    (StatusCode::OK, Json(reply)).into_response()
}
