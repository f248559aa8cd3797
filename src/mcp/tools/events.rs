//! Event Tools

use serde::Deserialize;
use serde_json::json;

use super::common::{id_schema, list_schema, object_schema, IdArgs, Pagination};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::{check_not_blank, ValidationError};
use crate::websets::endpoints;

static LIST_EVENTS: Operation = Operation {
    tool: "list_events",
    endpoint: endpoints::LIST_EVENTS,
    bad_request_help: None,
};

static GET_EVENT: Operation = Operation {
    tool: "get_event",
    endpoint: endpoints::GET_EVENT,
    bad_request_help: None,
};

/// Register event tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<ListEventsArgs>(
        &LIST_EVENTS,
        "List recent events across all websets (webset.created, webset.item.created, \
         webset.search.completed, ...), newest first.",
        list_schema(
            vec![(
                "types",
                json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Only return events of these types"
                }),
            )],
            &[],
        ),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &GET_EVENT,
        "Get a single event with its payload.",
        object_schema(vec![("id", id_schema("The ID of the event"))], &["id"]),
    ));
}

#[derive(Debug, Deserialize)]
struct ListEventsArgs {
    #[serde(default)]
    types: Option<Vec<String>>,
    #[serde(flatten)]
    page: Pagination,
}

impl ToolArgs for ListEventsArgs {
    fn query(&self) -> Vec<(String, String)> {
        let mut query = self.page.query();
        for event_type in self.types.iter().flatten() {
            query.push(("types".to_string(), event_type.clone()));
        }
        query
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.page.validate()?;
        for (i, event_type) in self.types.iter().flatten().enumerate() {
            check_not_blank(&format!("types[{}]", i), event_type)?;
        }
        Ok(())
    }
}
