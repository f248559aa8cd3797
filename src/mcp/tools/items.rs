//! Item Tools

use serde::Deserialize;
use serde_json::Value;

use super::common::{id_schema, list_schema, object_schema, Pagination};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::ValidationError;
use crate::websets::endpoints;

static LIST_ITEMS: Operation = Operation {
    tool: "list_webset_items",
    endpoint: endpoints::LIST_ITEMS,
    bad_request_help: None,
};

static GET_ITEM: Operation = Operation {
    tool: "get_item",
    endpoint: endpoints::GET_ITEM,
    bad_request_help: None,
};

static DELETE_ITEM: Operation = Operation {
    tool: "delete_item",
    endpoint: endpoints::DELETE_ITEM,
    bad_request_help: None,
};

/// Register item tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<ListItemsArgs>(
        &LIST_ITEMS,
        "List the items of a webset: the entities (companies, people, papers) that were \
         discovered and verified, with their enrichment results.",
        list_schema(
            vec![("websetId", id_schema("The ID or externalId of the webset"))],
            &["websetId"],
        ),
    ));

    registry.register_tool(upstream_tool::<ItemRefArgs>(
        &GET_ITEM,
        "Get a single item with its properties, verification and enrichment results.",
        item_ref_schema(),
    ));

    registry.register_tool(upstream_tool::<ItemRefArgs>(
        &DELETE_ITEM,
        "Remove an item from a webset.",
        item_ref_schema(),
    ));
}

fn item_ref_schema() -> Value {
    object_schema(
        vec![
            ("websetId", id_schema("The ID or externalId of the webset")),
            ("itemId", id_schema("The ID of the item")),
        ],
        &["websetId", "itemId"],
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListItemsArgs {
    webset_id: String,
    #[serde(flatten)]
    page: Pagination,
}

impl ToolArgs for ListItemsArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("websetId", self.webset_id.as_str())]
    }

    fn query(&self) -> Vec<(String, String)> {
        self.page.query()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.page.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRefArgs {
    webset_id: String,
    item_id: String,
}

impl ToolArgs for ItemRefArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("websetId", self.webset_id.as_str()),
            ("itemId", self.item_id.as_str()),
        ]
    }
}
