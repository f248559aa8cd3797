use std::any::Any;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info};

use super::metrics::{init_metrics, metrics_handler};
use super::router::SessionRouter;
use super::state::ServerState;
use super::transport::{internal_error_response, SESSION_HEADER};
use super::{log_requests, ServerConfig};

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn handle_mcp(
    State(router): State<SessionRouter>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    match router.route(&method, session_id, body).await {
        Ok(response) => response,
        Err(e) => {
            error!("Error handling MCP request: {}", e);
            internal_error_response()
        }
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Panic while handling request: {}", detail);
    internal_error_response()
}

pub fn make_app(config: ServerConfig, router: SessionRouter) -> Router {
    let state = ServerState { config, router };

    Router::new()
        .route("/health", get(health))
        .route(
            "/message",
            get(handle_mcp).post(handle_mcp).delete(handle_mcp),
        )
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}

pub async fn run_server(config: ServerConfig, router: SessionRouter) -> Result<()> {
    init_metrics();

    if config.metrics_port != 0 {
        let metrics_addr = format!("{}:{}", config.host, config.metrics_port);
        let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {}", metrics_addr))?;
        info!("Metrics available at {}/metrics", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
                error!("Metrics server stopped: {}", e);
            }
        });
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Ready to serve MCP at http://{}/message", addr);
    let app = make_app(config, router);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::McpRegistry;
    use crate::server::RequestsLoggingLevel;
    use crate::websets::testing::RecordingApi;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let router = SessionRouter::new(
            Arc::new(McpRegistry::new()),
            Arc::new(RecordingApi::ok()),
            None,
        );
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        make_app(config, router)
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn message_endpoint_routes_to_sessions() {
        let request = Request::builder()
            .method("POST")
            .uri("/message")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(SESSION_HEADER));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let request = Request::builder()
            .uri("/v1/anything")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn panics_become_internal_error() {
        async fn boom() -> Response {
            panic!("handler exploded")
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], -32603);
        assert_eq!(body["id"], serde_json::Value::Null);
    }
}
