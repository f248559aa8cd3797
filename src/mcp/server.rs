//! Per-session MCP protocol server.
//!
//! Dispatches JSON-RPC requests arriving on one session to the lifecycle
//! handlers and the shared tool registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::context::ToolContext;
use super::protocol::{
    methods, negotiate_protocol_version, InitializeParams, InitializeResult, McpError,
    McpRequest, McpResponse, PingResult, ServerCapabilities, ServerInfo, ToolsCallParams,
    ToolsCapability, ToolsListResult,
};
use super::registry::McpRegistry;
use crate::websets::WebsetsApi;

pub const SERVER_NAME: &str = "websets-server";

const INSTRUCTIONS: &str = "Tools for the Exa Websets API. A webset is a collection of web \
entities (companies, people, articles, research papers) found by searches and verified \
against criteria. Typical flow: create_webset with a searchQuery, poll get_webset until its \
status is idle, then list_webset_items. Add columns with create_enrichment and keep a webset \
fresh with create_monitor.";

pub struct McpServer {
    session_id: String,
    registry: Arc<McpRegistry>,
    api: Arc<dyn WebsetsApi>,
    initialized: AtomicBool,
}

impl McpServer {
    pub fn new(
        session_id: impl Into<String>,
        registry: Arc<McpRegistry>,
        api: Arc<dyn WebsetsApi>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            registry,
            api,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(request_id) = request.id.clone() else {
            debug!("Notification {} on session {}", request.method, self.session_id);
            return None;
        };

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request.params),
            methods::PING => to_value(PingResult {}),
            methods::TOOLS_LIST => self
                .require_initialized()
                .and_then(|_| self.handle_tools_list()),
            methods::TOOLS_CALL => match self.require_initialized() {
                Ok(()) => self.handle_tools_call(request.params).await,
                Err(e) => Err(e),
            },
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Some(match result {
            Ok(value) => McpResponse::success(request_id, value),
            Err(error) => McpResponse::error(Some(request_id), error),
        })
    }

    fn require_initialized(&self) -> Result<(), McpError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(McpError::InvalidRequest("Not initialized".to_string()))
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            debug!(
                "Session {} initialized by {} {}",
                self.session_id,
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }

        self.initialized.store(true, Ordering::SeqCst);

        to_value(InitializeResult {
            protocol_version: negotiate_protocol_version(params.protocol_version.as_deref())
                .to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: None },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        })
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        to_value(ToolsListResult {
            tools: self.registry.tool_definitions(),
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolsCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

        let tool = self
            .registry
            .get_tool(&params.name)
            .ok_or_else(|| McpError::InvalidParams(format!("Unknown tool: {}", params.name)))?;

        let ctx = ToolContext::new(self.api.clone(), self.session_id.as_str(), &tool.name);
        let arguments = params
            .arguments
            .unwrap_or_else(|| Value::Object(Default::default()));

        let result = (tool.handler)(ctx, arguments).await?;
        to_value(result)
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
