//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own session table, talking to
//! a fake upstream (or to whatever base URL the options name).

use super::constants::*;
use super::fake_upstream::FakeUpstream;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use websets_mcp_server::mcp::build_registry;
use websets_mcp_server::{
    make_app, RequestsLoggingLevel, ServerConfig, SessionRouter, WebsetsApi, WebsetsClient,
};

/// Knobs for servers that deviate from the default test setup
pub struct ServerOptions {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub idle_timeout: Option<Duration>,
}

impl ServerOptions {
    pub fn for_upstream(upstream: &FakeUpstream) -> Self {
        Self {
            api_base_url: upstream.base_url.clone(),
            api_key: Some(TEST_API_KEY.to_string()),
            idle_timeout: None,
        }
    }
}

/// Test server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Handle on the live session table, for assertions
    pub router: SessionRouter,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server whose tools call `upstream`
    pub async fn spawn(upstream: &FakeUpstream) -> Self {
        Self::spawn_with(ServerOptions::for_upstream(upstream)).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the server doesn't become ready
    /// within the timeout.
    pub async fn spawn_with(options: ServerOptions) -> Self {
        let client = WebsetsClient::new(
            &options.api_base_url,
            options.api_key,
            Duration::from_secs(UPSTREAM_TIMEOUT_SECS),
        )
        .expect("Failed to build Websets client");
        let api: Arc<dyn WebsetsApi> = Arc::new(client);
        let router = SessionRouter::new(Arc::new(build_registry()), api, options.idle_timeout);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            host: "127.0.0.1".to_string(),
            port,
            metrics_port: 0,
        };
        let app = make_app(config, router.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            router,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling /health
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
