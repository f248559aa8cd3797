//! Webhook Tools
//!
//! Webhooks deliver upstream events (e.g. `webset.item.created`) to an HTTP endpoint.

use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{
    id_schema, list_schema, metadata_schema, object_schema, Body, IdArgs, ListArgs, Pagination,
};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::{
    check_any_field, check_http_url, check_metadata, check_non_empty_list, check_not_blank,
    Metadata, ValidationError,
};
use crate::websets::endpoints;

const CREATE_WEBHOOK_HELP: &str = "Common issues:\n\
- url must be a publicly reachable http(s) URL\n\
- events must be a non-empty array of event types such as \"webset.item.created\"\n\n\
Example:\n\
{\n\
  \"url\": \"https://example.com/hooks/websets\",\n\
  \"events\": [\"webset.item.created\", \"webset.idle\"]\n\
}";

static CREATE_WEBHOOK: Operation = Operation {
    tool: "create_webhook",
    endpoint: endpoints::CREATE_WEBHOOK,
    bad_request_help: Some(CREATE_WEBHOOK_HELP),
};

static GET_WEBHOOK: Operation = Operation {
    tool: "get_webhook",
    endpoint: endpoints::GET_WEBHOOK,
    bad_request_help: None,
};

static LIST_WEBHOOKS: Operation = Operation {
    tool: "list_webhooks",
    endpoint: endpoints::LIST_WEBHOOKS,
    bad_request_help: None,
};

static UPDATE_WEBHOOK: Operation = Operation {
    tool: "update_webhook",
    endpoint: endpoints::UPDATE_WEBHOOK,
    bad_request_help: None,
};

static DELETE_WEBHOOK: Operation = Operation {
    tool: "delete_webhook",
    endpoint: endpoints::DELETE_WEBHOOK,
    bad_request_help: None,
};

static LIST_WEBHOOK_ATTEMPTS: Operation = Operation {
    tool: "list_webhook_attempts",
    endpoint: endpoints::LIST_WEBHOOK_ATTEMPTS,
    bad_request_help: None,
};

fn events_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "items": { "type": "string" },
        "description": "Event types to deliver, e.g. [\"webset.created\", \"webset.item.enriched\"]"
    })
}

/// Register webhook tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<CreateWebhookArgs>(
        &CREATE_WEBHOOK,
        "Register a webhook that receives the selected events. The response contains the \
         signing secret; it is only shown once.",
        object_schema(
            vec![
                (
                    "url",
                    json!({ "type": "string", "format": "uri", "description": "HTTPS endpoint receiving events" }),
                ),
                ("events", events_schema()),
                ("metadata", metadata_schema()),
            ],
            &["url", "events"],
        ),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &GET_WEBHOOK,
        "Get a webhook's configuration and status.",
        object_schema(vec![("id", id_schema("The ID of the webhook"))], &["id"]),
    ));

    registry.register_tool(upstream_tool::<ListArgs>(
        &LIST_WEBHOOKS,
        "List registered webhooks.",
        list_schema(vec![], &[]),
    ));

    registry.register_tool(upstream_tool::<UpdateWebhookArgs>(
        &UPDATE_WEBHOOK,
        "Change a webhook's URL, subscribed events or metadata.",
        object_schema(
            vec![
                ("id", id_schema("The ID of the webhook")),
                (
                    "url",
                    json!({ "type": "string", "format": "uri", "description": "New endpoint URL" }),
                ),
                ("events", events_schema()),
                ("metadata", metadata_schema()),
            ],
            &["id"],
        ),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &DELETE_WEBHOOK,
        "Delete a webhook. No further events are delivered to it.",
        object_schema(vec![("id", id_schema("The ID of the webhook"))], &["id"]),
    ));

    registry.register_tool(upstream_tool::<ListAttemptsArgs>(
        &LIST_WEBHOOK_ATTEMPTS,
        "List delivery attempts of a webhook, including response status and payload.",
        list_schema(
            vec![
                ("id", id_schema("The ID of the webhook")),
                (
                    "eventType",
                    json!({ "type": "string", "description": "Only attempts for this event type" }),
                ),
                (
                    "successful",
                    json!({ "type": "boolean", "description": "Only successful (true) or failed (false) attempts" }),
                ),
            ],
            &["id"],
        ),
    ));
}

fn check_events(events: &[String]) -> Result<(), ValidationError> {
    check_non_empty_list("events", events)?;
    for (i, event) in events.iter().enumerate() {
        check_not_blank(&format!("events[{}]", i), event)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CreateWebhookArgs {
    url: String,
    events: Vec<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl ToolArgs for CreateWebhookArgs {
    fn validate(&self) -> Result<(), ValidationError> {
        check_http_url("url", &self.url)?;
        check_events(&self.events)?;
        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        Some(
            Body::new()
                .field("url", &self.url)
                .field("events", &self.events)
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct UpdateWebhookArgs {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    events: Option<Vec<String>>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl ToolArgs for UpdateWebhookArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("id", self.id.as_str())]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_any_field(
            &[
                self.url.is_some(),
                self.events.is_some(),
                self.metadata.is_some(),
            ],
            "url, events, metadata",
        )?;
        if let Some(url) = &self.url {
            check_http_url("url", url)?;
        }
        if let Some(events) = &self.events {
            check_events(events)?;
        }
        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        Some(
            Body::new()
                .optional("url", self.url.as_ref())
                .optional("events", self.events.as_ref())
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAttemptsArgs {
    id: String,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    successful: Option<bool>,
    #[serde(flatten)]
    page: Pagination,
}

impl ToolArgs for ListAttemptsArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("id", self.id.as_str())]
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = self.page.query();
        if let Some(event_type) = &self.event_type {
            query.push(("eventType".to_string(), event_type.clone()));
        }
        if let Some(successful) = self.successful {
            query.push(("successful".to_string(), successful.to_string()));
        }
        query
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.page.validate()
    }
}
