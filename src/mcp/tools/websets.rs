//! Webset Tools
//!
//! Create, inspect, update, cancel and delete webset collections.

use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{
    check_criteria, criteria_schema, enrichment_schema, entity_schema, id_schema, list_schema,
    metadata_schema, object_schema, Body, Criterion, EnrichmentSpec, Entity, IdArgs, ListArgs,
};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::{
    check_metadata, check_min, check_not_blank, Metadata, ValidationError,
};
use crate::websets::endpoints;

const CREATE_WEBSET_HELP: &str = "Common issues:\n\
- searchCriteria must be array of objects: [{\"description\": \"criterion\"}]\n\
- enrichments must be array of objects with description field\n\
- enrichment options must be array of objects: [{\"label\": \"option\"}]\n\
- searchCount must be a positive number\n\n\
Example:\n\
{\n\
  \"searchQuery\": \"AI startups in San Francisco\",\n\
  \"searchCriteria\": [{\"description\": \"Founded after 2020\"}],\n\
  \"enrichments\": [\n\
    {\"description\": \"CEO name\", \"format\": \"text\"},\n\
    {\"description\": \"Company stage\", \"format\": \"options\", \"options\": [{\"label\": \"Seed\"}, {\"label\": \"Series A\"}]}\n\
  ]\n\
}";

static CREATE_WEBSET: Operation = Operation {
    tool: "create_webset",
    endpoint: endpoints::CREATE_WEBSET,
    bad_request_help: Some(CREATE_WEBSET_HELP),
};

static PREVIEW_WEBSET: Operation = Operation {
    tool: "preview_webset",
    endpoint: endpoints::PREVIEW_WEBSET,
    bad_request_help: None,
};

static GET_WEBSET: Operation = Operation {
    tool: "get_webset",
    endpoint: endpoints::GET_WEBSET,
    bad_request_help: None,
};

static LIST_WEBSETS: Operation = Operation {
    tool: "list_websets",
    endpoint: endpoints::LIST_WEBSETS,
    bad_request_help: None,
};

static UPDATE_WEBSET: Operation = Operation {
    tool: "update_webset",
    endpoint: endpoints::UPDATE_WEBSET,
    bad_request_help: None,
};

static DELETE_WEBSET: Operation = Operation {
    tool: "delete_webset",
    endpoint: endpoints::DELETE_WEBSET,
    bad_request_help: None,
};

static CANCEL_WEBSET: Operation = Operation {
    tool: "cancel_webset",
    endpoint: endpoints::CANCEL_WEBSET,
    bad_request_help: None,
};

/// Register webset tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<CreateWebsetArgs>(
        &CREATE_WEBSET,
        "Create a new Webset collection. Websets are collections of web entities (companies, \
         people, papers) that are searched, verified and enriched automatically.\n\n\
         IMPORTANT PARAMETER FORMATS:\n\
         - searchCriteria: array of objects like [{\"description\": \"...\"}]\n\
         - enrichments: each needs a description, optional format and options\n\
         - enrichment options: array of objects like [{\"label\": \"...\"}]",
        object_schema(
            vec![
                (
                    "searchQuery",
                    json!({
                        "type": "string",
                        "description": "Natural language query to populate the webset (e.g., 'AI startups in San Francisco')"
                    }),
                ),
                (
                    "searchCount",
                    json!({
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of items to search for (default: 10)"
                    }),
                ),
                ("searchCriteria", criteria_schema()),
                ("entity", entity_schema()),
                (
                    "enrichments",
                    json!({
                        "type": "array",
                        "items": enrichment_schema(),
                        "description": "Data to extract for each item"
                    }),
                ),
                (
                    "externalId",
                    json!({ "type": "string", "description": "Your own identifier for the webset" }),
                ),
                ("metadata", metadata_schema()),
            ],
            &[],
        ),
    ));

    registry.register_tool(upstream_tool::<PreviewWebsetArgs>(
        &PREVIEW_WEBSET,
        "Preview how a search query will be interpreted (detected entity and criteria) \
         without creating a webset.",
        object_schema(
            vec![
                (
                    "query",
                    json!({ "type": "string", "description": "Natural language search query" }),
                ),
                (
                    "count",
                    json!({ "type": "integer", "minimum": 1, "description": "Number of sample results" }),
                ),
                ("entity", entity_schema()),
                ("criteria", criteria_schema()),
            ],
            &["query"],
        ),
    ));

    registry.register_tool(upstream_tool::<GetWebsetArgs>(
        &GET_WEBSET,
        "Get details about a specific webset including its searches, enrichments and status.",
        object_schema(
            vec![
                ("id", id_schema("The ID or externalId of the webset")),
                (
                    "expandItems",
                    json!({ "type": "boolean", "description": "Include the latest items in the response" }),
                ),
            ],
            &["id"],
        ),
    ));

    registry.register_tool(upstream_tool::<ListArgs>(
        &LIST_WEBSETS,
        "List all websets in your account, newest first.",
        list_schema(vec![], &[]),
    ));

    registry.register_tool(upstream_tool::<UpdateWebsetArgs>(
        &UPDATE_WEBSET,
        "Update a webset's metadata.",
        object_schema(
            vec![
                ("id", id_schema("The ID or externalId of the webset")),
                ("metadata", metadata_schema()),
            ],
            &["id", "metadata"],
        ),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &DELETE_WEBSET,
        "Delete a webset and all of its items. This cannot be undone.",
        object_schema(vec![("id", id_schema("The ID or externalId of the webset"))], &["id"]),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &CANCEL_WEBSET,
        "Cancel every running search and enrichment of a webset.",
        object_schema(vec![("id", id_schema("The ID or externalId of the webset"))], &["id"]),
    ));
}

// ============================================================================
// create_webset
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateWebsetArgs {
    #[serde(default)]
    search_query: Option<String>,
    #[serde(default)]
    search_count: Option<i64>,
    #[serde(default)]
    search_criteria: Option<Vec<Criterion>>,
    #[serde(default)]
    entity: Option<Entity>,
    #[serde(default)]
    enrichments: Option<Vec<EnrichmentSpec>>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl ToolArgs for CreateWebsetArgs {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.search_query {
            Some(query) => check_not_blank("searchQuery", query)?,
            None => {
                let dependent = [
                    ("searchCount", self.search_count.is_some()),
                    ("searchCriteria", self.search_criteria.is_some()),
                    ("entity", self.entity.is_some()),
                ];
                if let Some((field, _)) = dependent.iter().find(|(_, present)| *present) {
                    return Err(ValidationError::MissingCompanion {
                        field: "searchQuery".to_string(),
                        when: format!("{} is set", field),
                    });
                }
            }
        }
        check_min("searchCount", self.search_count, 1)?;
        check_criteria("searchCriteria", self.search_criteria.as_deref())?;
        if let Some(entity) = &self.entity {
            entity.validate()?;
        }
        for enrichment in self.enrichments.iter().flatten() {
            enrichment.validate()?;
        }
        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        let search = match &self.search_query {
            Some(query) => Body::new()
                .field("query", query)
                .optional("count", self.search_count)
                .optional("criteria", self.search_criteria.as_ref())
                .optional("entity", self.entity.as_ref()),
            None => Body::new(),
        };

        Some(
            Body::new()
                .nested("search", search)
                .optional(
                    "enrichments",
                    self.enrichments.as_ref().filter(|e| !e.is_empty()),
                )
                .optional("externalId", self.external_id.as_ref())
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}

// ============================================================================
// preview_webset
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewWebsetArgs {
    query: String,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    entity: Option<Entity>,
    #[serde(default)]
    criteria: Option<Vec<Criterion>>,
}

impl ToolArgs for PreviewWebsetArgs {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("query", &self.query)?;
        check_min("count", self.count, 1)?;
        check_criteria("criteria", self.criteria.as_deref())?;
        match &self.entity {
            Some(entity) => entity.validate(),
            None => Ok(()),
        }
    }

    fn body(&self) -> Option<Value> {
        let search = Body::new()
            .field("query", &self.query)
            .optional("count", self.count)
            .optional("entity", self.entity.as_ref())
            .optional("criteria", self.criteria.as_ref());
        Some(Body::new().nested("search", search).build())
    }
}

// ============================================================================
// get_webset / update_webset
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetWebsetArgs {
    id: String,
    #[serde(default)]
    expand_items: bool,
}

impl ToolArgs for GetWebsetArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("id", self.id.as_str())]
    }

    fn query(&self) -> Vec<(String, String)> {
        if self.expand_items {
            vec![("expand".to_string(), "items".to_string())]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateWebsetArgs {
    id: String,
    metadata: Metadata,
}

impl ToolArgs for UpdateWebsetArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("id", self.id.as_str())]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_metadata(Some(&self.metadata))
    }

    fn body(&self) -> Option<Value> {
        Some(json!({ "metadata": self.metadata }))
    }
}
