//! MCP Tool Execution Context
//!
//! Provides access to the upstream API for tool implementations.

use std::sync::Arc;

use crate::websets::WebsetsApi;

/// Context provided to tool handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Client for the Websets API
    pub api: Arc<dyn WebsetsApi>,

    /// Session the call arrived on
    pub session_id: String,

    /// Identifier generated per tool call, used to correlate log lines
    pub request_id: String,
}

impl ToolContext {
    pub fn new(api: Arc<dyn WebsetsApi>, session_id: impl Into<String>, tool: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            api,
            session_id: session_id.into(),
            request_id: format!("{}-{}", tool, &suffix[..12]),
        }
    }
}
