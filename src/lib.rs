//! Websets MCP Server Library
//!
//! Exposes the Exa Websets API as Model Context Protocol tools over
//! Streamable HTTP. The modules are public for the binary and the
//! end-to-end tests.

pub mod config;
pub mod mcp;
pub mod server;
pub mod websets;

// Re-export commonly used types for convenience
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig, SessionRouter};
pub use websets::{WebsetsApi, WebsetsClient};
