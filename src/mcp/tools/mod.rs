//! MCP Tools
//!
//! One tool per Websets API operation, grouped by resource.

pub mod common;
pub mod enrichments;
pub mod events;
pub mod items;
pub mod monitors;
pub mod searches;
pub mod webhooks;
pub mod websets;

use super::registry::McpRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    websets::register_tools(registry);
    searches::register_tools(registry);
    enrichments::register_tools(registry);
    items::register_tools(registry);
    monitors::register_tools(registry);
    webhooks::register_tools(registry);
    events::register_tools(registry);
}
