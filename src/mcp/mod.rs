//! MCP (Model Context Protocol) Server
//!
//! Exposes the Websets API as MCP tools. Each HTTP session owns one
//! [`McpServer`]; the tool registry is built once and shared.
//!
//! ## Architecture
//!
//! - Protocol: JSON-RPC 2.0 (`protocol`), dispatched per session (`server`)
//! - Tools: one generic executor (`executor`) plus typed arguments per tool (`tools`)
//! - Validation happens before any upstream call (`validation`)

pub mod context;
pub mod executor;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;
pub mod validation;

pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
pub use server::McpServer;

use tracing::info;

/// Builds the registry holding the complete tool catalog.
pub fn build_registry() -> McpRegistry {
    let mut registry = McpRegistry::new();
    tools::register_all_tools(&mut registry);
    info!("Registered {} MCP tools", registry.tool_count());
    registry
}
