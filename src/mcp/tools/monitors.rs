//! Monitor Tools
//!
//! Monitors run a search or a refresh against a webset on a cron schedule.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::{
    check_criteria, criteria_schema, entity_schema, id_schema, list_schema, metadata_schema,
    object_schema, search_behavior_schema, Body, Criterion, Entity, IdArgs, Pagination,
    SearchBehavior,
};
use crate::mcp::executor::{upstream_tool, Operation, ToolArgs};
use crate::mcp::registry::McpRegistry;
use crate::mcp::validation::{
    check_any_field, check_cron, check_metadata, check_min, check_not_blank, Metadata,
    ValidationError,
};
use crate::websets::endpoints;

const CREATE_MONITOR_HELP: &str = "Common issues:\n\
- cron must have 5 fields, e.g. \"0 9 * * 1\" for every Monday at 9am\n\
- behaviorType \"refresh\" needs refreshTarget and takes no search fields\n\
- criteria must be array of objects: [{\"description\": \"criterion\"}]\n\n\
Example:\n\
{\n\
  \"websetId\": \"webset_123\",\n\
  \"cron\": \"0 9 * * 1\",\n\
  \"query\": \"new biotech startups in San Diego\",\n\
  \"count\": 5,\n\
  \"behavior\": \"append\"\n\
}";

static CREATE_MONITOR: Operation = Operation {
    tool: "create_monitor",
    endpoint: endpoints::CREATE_MONITOR,
    bad_request_help: Some(CREATE_MONITOR_HELP),
};

static GET_MONITOR: Operation = Operation {
    tool: "get_monitor",
    endpoint: endpoints::GET_MONITOR,
    bad_request_help: None,
};

static LIST_MONITORS: Operation = Operation {
    tool: "list_monitors",
    endpoint: endpoints::LIST_MONITORS,
    bad_request_help: None,
};

static UPDATE_MONITOR: Operation = Operation {
    tool: "update_monitor",
    endpoint: endpoints::UPDATE_MONITOR,
    bad_request_help: None,
};

static DELETE_MONITOR: Operation = Operation {
    tool: "delete_monitor",
    endpoint: endpoints::DELETE_MONITOR,
    bad_request_help: None,
};

static LIST_MONITOR_RUNS: Operation = Operation {
    tool: "list_monitor_runs",
    endpoint: endpoints::LIST_MONITOR_RUNS,
    bad_request_help: None,
};

static GET_MONITOR_RUN: Operation = Operation {
    tool: "get_monitor_run",
    endpoint: endpoints::GET_MONITOR_RUN,
    bad_request_help: None,
};

/// Register monitor tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(upstream_tool::<CreateMonitorArgs>(
        &CREATE_MONITOR,
        "Create a monitor that updates a webset on a schedule. A 'search' monitor looks for new \
         items with the given query; a 'refresh' monitor re-runs enrichments or re-fetches \
         contents of existing items.",
        object_schema(
            vec![
                ("websetId", id_schema("The ID or externalId of the webset")),
                (
                    "cron",
                    json!({
                        "type": "string",
                        "description": "Five-field cron expression (e.g., '0 9 * * 1' for every Monday at 9am)"
                    }),
                ),
                (
                    "timezone",
                    json!({ "type": "string", "description": "IANA timezone for the schedule (default: Etc/UTC)" }),
                ),
                (
                    "behaviorType",
                    json!({
                        "type": "string",
                        "enum": ["search", "refresh"],
                        "description": "'search' finds new items (default), 'refresh' updates existing ones"
                    }),
                ),
                (
                    "query",
                    json!({ "type": "string", "description": "Search query (search monitors)" }),
                ),
                (
                    "count",
                    json!({ "type": "integer", "minimum": 1, "description": "Items to find per run (search monitors)" }),
                ),
                ("criteria", criteria_schema()),
                ("entity", entity_schema()),
                ("behavior", search_behavior_schema()),
                (
                    "refreshTarget",
                    json!({
                        "type": "string",
                        "enum": ["enrichments", "contents"],
                        "description": "What a refresh monitor updates"
                    }),
                ),
                ("metadata", metadata_schema()),
            ],
            &["websetId", "cron"],
        ),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &GET_MONITOR,
        "Get a monitor's configuration, status and next run time.",
        object_schema(vec![("id", id_schema("The ID of the monitor"))], &["id"]),
    ));

    registry.register_tool(upstream_tool::<ListMonitorsArgs>(
        &LIST_MONITORS,
        "List monitors, optionally only those of one webset.",
        list_schema(
            vec![("websetId", id_schema("Only return monitors of this webset"))],
            &[],
        ),
    ));

    registry.register_tool(upstream_tool::<UpdateMonitorArgs>(
        &UPDATE_MONITOR,
        "Enable or disable a monitor, change its schedule, or update its metadata.",
        object_schema(
            vec![
                ("id", id_schema("The ID of the monitor")),
                (
                    "status",
                    json!({ "type": "string", "enum": ["enabled", "disabled"] }),
                ),
                (
                    "cron",
                    json!({ "type": "string", "description": "New five-field cron expression" }),
                ),
                (
                    "timezone",
                    json!({ "type": "string", "description": "IANA timezone, sent together with cron" }),
                ),
                ("metadata", metadata_schema()),
            ],
            &["id"],
        ),
    ));

    registry.register_tool(upstream_tool::<IdArgs>(
        &DELETE_MONITOR,
        "Delete a monitor. Items it already added stay in the webset.",
        object_schema(vec![("id", id_schema("The ID of the monitor"))], &["id"]),
    ));

    registry.register_tool(upstream_tool::<ListMonitorRunsArgs>(
        &LIST_MONITOR_RUNS,
        "List the runs of a monitor, newest first.",
        list_schema(
            vec![("monitorId", id_schema("The ID of the monitor"))],
            &["monitorId"],
        ),
    ));

    registry.register_tool(upstream_tool::<MonitorRunRefArgs>(
        &GET_MONITOR_RUN,
        "Get a single monitor run.",
        object_schema(
            vec![
                ("monitorId", id_schema("The ID of the monitor")),
                ("runId", id_schema("The ID of the run")),
            ],
            &["monitorId", "runId"],
        ),
    ));
}

// ============================================================================
// create_monitor
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MonitorBehaviorType {
    #[default]
    Search,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum RefreshTarget {
    Enrichments,
    Contents,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMonitorArgs {
    webset_id: String,
    cron: String,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    behavior_type: MonitorBehaviorType,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    criteria: Option<Vec<Criterion>>,
    #[serde(default)]
    entity: Option<Entity>,
    #[serde(default)]
    behavior: Option<SearchBehavior>,
    #[serde(default)]
    refresh_target: Option<RefreshTarget>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl CreateMonitorArgs {
    fn search_fields(&self) -> [(&'static str, bool); 5] {
        [
            ("query", self.query.is_some()),
            ("count", self.count.is_some()),
            ("criteria", self.criteria.is_some()),
            ("entity", self.entity.is_some()),
            ("behavior", self.behavior.is_some()),
        ]
    }
}

impl ToolArgs for CreateMonitorArgs {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("websetId", &self.webset_id)?;
        check_cron(&self.cron)?;
        if let Some(timezone) = &self.timezone {
            check_not_blank("timezone", timezone)?;
        }

        match self.behavior_type {
            MonitorBehaviorType::Search => {
                if self.refresh_target.is_some() {
                    return Err(ValidationError::NotAllowed {
                        field: "refreshTarget".to_string(),
                        when: "behaviorType is search".to_string(),
                    });
                }
                if let Some(query) = &self.query {
                    check_not_blank("query", query)?;
                }
                check_min("count", self.count, 1)?;
                check_criteria("criteria", self.criteria.as_deref())?;
                if let Some(entity) = &self.entity {
                    entity.validate()?;
                }
            }
            MonitorBehaviorType::Refresh => {
                if self.refresh_target.is_none() {
                    return Err(ValidationError::MissingCompanion {
                        field: "refreshTarget".to_string(),
                        when: "behaviorType is refresh".to_string(),
                    });
                }
                if let Some((field, _)) = self.search_fields().iter().find(|(_, set)| *set) {
                    return Err(ValidationError::NotAllowed {
                        field: field.to_string(),
                        when: "behaviorType is refresh".to_string(),
                    });
                }
            }
        }

        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        let cadence = Body::new()
            .field("cron", self.cron.trim())
            .optional("timezone", self.timezone.as_ref());

        let behavior = match self.behavior_type {
            MonitorBehaviorType::Search => {
                let config = Body::new()
                    .optional("query", self.query.as_ref())
                    .optional("count", self.count)
                    .optional("criteria", self.criteria.as_ref())
                    .optional("entity", self.entity.as_ref())
                    .optional("behavior", self.behavior);
                Body::new()
                    .field("type", "search")
                    .field("config", config.build())
            }
            MonitorBehaviorType::Refresh => Body::new()
                .field("type", "refresh")
                .field("config", json!({ "target": self.refresh_target })),
        };

        Some(
            Body::new()
                .field("websetId", &self.webset_id)
                .nested("cadence", cadence)
                .nested("behavior", behavior)
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}

// ============================================================================
// list / update / runs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMonitorsArgs {
    #[serde(default)]
    webset_id: Option<String>,
    #[serde(flatten)]
    page: Pagination,
}

impl ToolArgs for ListMonitorsArgs {
    fn query(&self) -> Vec<(String, String)> {
        let mut query = self.page.query();
        if let Some(webset_id) = self.webset_id.as_deref().filter(|id| !id.is_empty()) {
            query.push(("websetId".to_string(), webset_id.to_string()));
        }
        query
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.page.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum MonitorStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Deserialize)]
struct UpdateMonitorArgs {
    id: String,
    #[serde(default)]
    status: Option<MonitorStatus>,
    #[serde(default)]
    cron: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl ToolArgs for UpdateMonitorArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("id", self.id.as_str())]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_any_field(
            &[
                self.status.is_some(),
                self.cron.is_some(),
                self.metadata.is_some(),
            ],
            "status, cron, metadata",
        )?;
        if self.timezone.is_some() && self.cron.is_none() {
            return Err(ValidationError::MissingCompanion {
                field: "cron".to_string(),
                when: "timezone is set".to_string(),
            });
        }
        if let Some(cron) = &self.cron {
            check_cron(cron)?;
        }
        check_metadata(self.metadata.as_ref())
    }

    fn body(&self) -> Option<Value> {
        let cadence = match &self.cron {
            Some(cron) => Body::new()
                .field("cron", cron.trim())
                .optional("timezone", self.timezone.as_ref()),
            None => Body::new(),
        };

        Some(
            Body::new()
                .optional("status", self.status)
                .nested("cadence", cadence)
                .optional("metadata", self.metadata.as_ref())
                .build(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMonitorRunsArgs {
    monitor_id: String,
    #[serde(flatten)]
    page: Pagination,
}

impl ToolArgs for ListMonitorRunsArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("monitorId", self.monitor_id.as_str())]
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
struct MonitorRunRefArgs {
    monitor_id: String,
    run_id: String,
}

impl ToolArgs for MonitorRunRefArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("monitorId", self.monitor_id.as_str()),
            ("runId", self.run_id.as_str()),
        ]
    }
}
