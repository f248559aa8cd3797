//! Enrichment Tools
//!
//! Enrichments extract additional data for every item of a webset.

use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{
    check_options, format_schema, id_schema, metadata_schema, object_schema, options_schema, Body,
    EnrichmentFormat, EnrichmentOption, EnrichmentSpec,
};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::{
    check_any_field, check_metadata, check_not_blank, Metadata, ValidationError,
};
use crate::websets::endpoints;

const CREATE_ENRICHMENT_HELP: &str = "Common issues:\n\
- description is required and describes the data to extract\n\
- format must be one of text, date, number, options, email, phone, url\n\
- options must be array of objects: [{\"label\": \"option\"}] and is only allowed with format \"options\"\n\n\
Example:\n\
{\n\
  \"websetId\": \"webset_123\",\n\
  \"description\": \"Company stage\",\n\
  \"format\": \"options\",\n\
  \"options\": [{\"label\": \"Seed\"}, {\"label\": \"Series A\"}]\n\
}";

static CREATE_ENRICHMENT: Operation = Operation {
    tool: "create_enrichment",
    endpoint: endpoints::CREATE_ENRICHMENT,
    bad_request_help: Some(CREATE_ENRICHMENT_HELP),
};

static GET_ENRICHMENT: Operation = Operation {
    tool: "get_enrichment",
    endpoint: endpoints::GET_ENRICHMENT,
    bad_request_help: None,
};

static UPDATE_ENRICHMENT: Operation = Operation {
    tool: "update_enrichment",
    endpoint: endpoints::UPDATE_ENRICHMENT,
    bad_request_help: None,
};

static DELETE_ENRICHMENT: Operation = Operation {
    tool: "delete_enrichment",
    endpoint: endpoints::DELETE_ENRICHMENT,
    bad_request_help: None,
};

static CANCEL_ENRICHMENT: Operation = Operation {
    tool: "cancel_enrichment",
    endpoint: endpoints::CANCEL_ENRICHMENT,
    bad_request_help: None,
};

/// Register enrichment tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<CreateEnrichmentArgs>(
        &CREATE_ENRICHMENT,
        "Add an enrichment to a webset. The description says what to extract for each item \
         (e.g., 'Annual revenue in USD'). With format 'options', pass the allowed values as \
         [{\"label\": \"...\"}].",
        object_schema(
            vec![
                ("websetId", id_schema("The ID or externalId of the webset")),
                (
                    "description",
                    json!({ "type": "string", "description": "What data to extract for each item" }),
                ),
                ("format", format_schema()),
                ("options", options_schema()),
                ("metadata", metadata_schema()),
            ],
            &["websetId", "description"],
        ),
    ));

    registry.register_tool(upstream_tool::<EnrichmentRefArgs>(
        &GET_ENRICHMENT,
        "Get the definition and status of an enrichment.",
        enrichment_ref_schema(),
    ));

    registry.register_tool(upstream_tool::<UpdateEnrichmentArgs>(
        &UPDATE_ENRICHMENT,
        "Update an enrichment's description, format, options or metadata.",
        object_schema(
            vec![
                ("websetId", id_schema("The ID or externalId of the webset")),
                ("enrichmentId", id_schema("The ID of the enrichment")),
                (
                    "description",
                    json!({ "type": "string", "description": "New description of the data to extract" }),
                ),
                ("format", format_schema()),
                ("options", options_schema()),
                ("metadata", metadata_schema()),
            ],
            &["websetId", "enrichmentId"],
        ),
    ));

    registry.register_tool(upstream_tool::<EnrichmentRefArgs>(
        &DELETE_ENRICHMENT,
        "Delete an enrichment and the values it extracted.",
        enrichment_ref_schema(),
    ));

    registry.register_tool(upstream_tool::<EnrichmentRefArgs>(
        &CANCEL_ENRICHMENT,
        "Cancel a running enrichment.",
        enrichment_ref_schema(),
    ));
}

fn enrichment_ref_schema() -> Value {
    object_schema(
        vec![
            ("websetId", id_schema("The ID or externalId of the webset")),
            ("enrichmentId", id_schema("The ID of the enrichment")),
        ],
        &["websetId", "enrichmentId"],
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEnrichmentArgs {
    webset_id: String,
    #[serde(flatten)]
    spec: EnrichmentSpec,
}

impl ToolArgs for CreateEnrichmentArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("websetId", self.webset_id.as_str())]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.spec.validate()
    }

    fn body(&self) -> Option<Value> {
        Some(json!(self.spec))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrichmentRefArgs {
    webset_id: String,
    enrichment_id: String,
}

impl ToolArgs for EnrichmentRefArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("websetId", self.webset_id.as_str()),
            ("enrichmentId", self.enrichment_id.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEnrichmentArgs {
    webset_id: String,
    enrichment_id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    format: Option<EnrichmentFormat>,
    #[serde(default)]
    options: Option<Vec<EnrichmentOption>>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl ToolArgs for UpdateEnrichmentArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("websetId", self.webset_id.as_str()),
            ("enrichmentId", self.enrichment_id.as_str()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_any_field(
            &[
                self.description.is_some(),
                self.format.is_some(),
                self.options.is_some(),
                self.metadata.is_some(),
            ],
            "description, format, options, metadata",
        )?;
        if let Some(description) = &self.description {
            check_not_blank("description", description)?;
        }
        check_options(self.format, self.options.as_deref(), false)?;
        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        Some(
            Body::new()
                .optional("description", self.description.as_ref())
                .optional("format", self.format)
                .optional("options", self.options.as_ref())
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}
