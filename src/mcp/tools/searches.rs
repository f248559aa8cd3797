//! Search Tools
//!
//! Searches discover new items for a webset.

use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{
    check_criteria, criteria_schema, entity_schema, id_schema, metadata_schema, object_schema,
    search_behavior_schema, Body, Criterion, Entity, SearchBehavior,
};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::{
    check_metadata, check_min, check_not_blank, Metadata, ValidationError,
};
use crate::websets::endpoints;

const CREATE_SEARCH_HELP: &str = "Common issues:\n\
- criteria must be array of objects: [{\"description\": \"criterion\"}]\n\
- entity must be object: {\"type\": \"company\"}\n\
- count must be a positive number\n\
- behavior must be \"override\" or \"append\"\n\n\
Example:\n\
{\n\
  \"websetId\": \"webset_123\",\n\
  \"query\": \"AI startups in San Francisco\",\n\
  \"entity\": {\"type\": \"company\"},\n\
  \"criteria\": [{\"description\": \"Founded after 2020\"}],\n\
  \"count\": 10\n\
}";

static CREATE_SEARCH: Operation = Operation {
    tool: "create_search",
    endpoint: endpoints::CREATE_SEARCH,
    bad_request_help: Some(CREATE_SEARCH_HELP),
};

static GET_SEARCH: Operation = Operation {
    tool: "get_search",
    endpoint: endpoints::GET_SEARCH,
    bad_request_help: None,
};

static CANCEL_SEARCH: Operation = Operation {
    tool: "cancel_search",
    endpoint: endpoints::CANCEL_SEARCH,
    bad_request_help: None,
};

/// Register search tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<CreateSearchArgs>(
        &CREATE_SEARCH,
        "Create a new search to find and add items to a webset. The search discovers entities \
         matching your query and criteria.\n\n\
         IMPORTANT PARAMETER FORMATS:\n\
         - entity: an object like {\"type\": \"company\"} (NOT a string)\n\
         - criteria: array of objects like [{\"description\": \"...\"}]",
        object_schema(
            vec![
                ("websetId", id_schema("The ID or externalId of the webset")),
                (
                    "query",
                    json!({
                        "type": "string",
                        "description": "Natural language query describing what to search for"
                    }),
                ),
                (
                    "count",
                    json!({
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of items to find (default: 10)"
                    }),
                ),
                ("entity", entity_schema()),
                ("criteria", criteria_schema()),
                ("behavior", search_behavior_schema()),
                (
                    "recall",
                    json!({ "type": "boolean", "description": "Estimate the total number of matching entities" }),
                ),
                ("metadata", metadata_schema()),
            ],
            &["websetId", "query"],
        ),
    ));

    registry.register_tool(upstream_tool::<SearchRefArgs>(
        &GET_SEARCH,
        "Get the status and progress of a search.",
        search_ref_schema(),
    ));

    registry.register_tool(upstream_tool::<SearchRefArgs>(
        &CANCEL_SEARCH,
        "Cancel a running search. Items found so far are kept.",
        search_ref_schema(),
    ));
}

fn search_ref_schema() -> Value {
    object_schema(
        vec![
            ("websetId", id_schema("The ID or externalId of the webset")),
            ("searchId", id_schema("The ID of the search")),
        ],
        &["websetId", "searchId"],
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSearchArgs {
    webset_id: String,
    query: String,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    entity: Option<Entity>,
    #[serde(default)]
    criteria: Option<Vec<Criterion>>,
    #[serde(default)]
    behavior: Option<SearchBehavior>,
    #[serde(default)]
    recall: Option<bool>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl ToolArgs for CreateSearchArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("websetId", self.webset_id.as_str())]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("query", &self.query)?;
        check_min("count", self.count, 1)?;
        check_criteria("criteria", self.criteria.as_deref())?;
        if let Some(entity) = &self.entity {
            entity.validate()?;
        }
        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        Some(
            Body::new()
                .field("query", &self.query)
                .optional("count", self.count)
                .optional("entity", self.entity.as_ref())
                .optional("criteria", self.criteria.as_ref())
                .optional("behavior", self.behavior)
                .optional("recall", self.recall)
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRefArgs {
    webset_id: String,
    search_id: String,
}

impl ToolArgs for SearchRefArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("websetId", self.webset_id.as_str()),
            ("searchId", self.search_id.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_search_body() {
        let args: CreateSearchArgs = serde_json::from_value(json!({
            "websetId": "ws_1",
            "query": "biotech startups",
            "count": 5,
            "entity": {"type": "company"},
            "behavior": "append"
        }))
        .unwrap();
        assert!(args.validate().is_ok());
        assert_eq!(
            args.body().unwrap(),
            json!({
                "query": "biotech startups",
                "count": 5,
                "entity": {"type": "company"},
                "behavior": "append"
            })
        );
        assert_eq!(args.path_params(), vec![("websetId", "ws_1")]);
    }

    #[test]
    fn create_search_rejects_bad_behavior() {
        let parsed: Result<CreateSearchArgs, _> = serde_json::from_value(json!({
            "websetId": "ws_1",
            "query": "q",
            "behavior": "replace"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn create_search_rejects_zero_count_and_too_many_criteria() {
        let zero: CreateSearchArgs =
            serde_json::from_value(json!({ "websetId": "ws", "query": "q", "count": 0 })).unwrap();
        assert!(zero.validate().is_err());

        let criteria: Vec<Value> = (0..6).map(|i| json!({"description": format!("c{}", i)})).collect();
        let many: CreateSearchArgs = serde_json::from_value(json!({
            "websetId": "ws",
            "query": "q",
            "criteria": criteria
        }))
        .unwrap();
        assert!(many.validate().is_err());
    }

    #[test]
    fn search_ref_params() {
        let args: SearchRefArgs =
            serde_json::from_value(json!({ "websetId": "ws", "searchId": "s" })).unwrap();
        assert_eq!(args.path_params(), vec![("websetId", "ws"), ("searchId", "s")]);
    }
}
