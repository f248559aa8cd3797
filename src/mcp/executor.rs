//! Generic executor shared by every Websets tool.
//!
//! A tool is an [`Operation`] (name, upstream endpoint, optional 400 help text)
//! plus an argument type implementing [`ToolArgs`]. Execution is always:
//! deserialize, validate, render the path, issue exactly one upstream call,
//! wrap the outcome in a [`ToolsCallResult`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};

use super::context::ToolContext;
use super::protocol::{McpError, ToolsCallResult};
use super::registry::{RegisteredTool, ToolBuilder, ToolResult};
use super::validation::ValidationError;
use crate::server::metrics;
use crate::websets::{ApiError, ApiRequest, Endpoint};

/// Hints appended to upstream errors, keyed by status.
const STATUS_HINTS: &[(u16, &str)] = &[
    (
        401,
        "This error indicates your API key is invalid or missing. Please check your EXA_API_KEY.",
    ),
    (
        404,
        "The requested resource was not found. Please verify the ID is correct.",
    ),
    (
        429,
        "Rate limit exceeded. Please wait before making more requests.",
    ),
];

/// A tool bound to one upstream endpoint.
#[derive(Debug)]
pub struct Operation {
    pub tool: &'static str,
    pub endpoint: Endpoint,
    /// Appended to upstream 400 errors.
    pub bad_request_help: Option<&'static str>,
}

/// Typed arguments of one tool.
pub trait ToolArgs: DeserializeOwned + Send + 'static {
    /// Values for the endpoint's `{placeholders}`.
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<Value> {
        None
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Registers `op` as a tool backed by [`execute`].
pub fn upstream_tool<A: ToolArgs>(
    op: &'static Operation,
    description: &str,
    input_schema: Value,
) -> RegisteredTool {
    ToolBuilder::new(op.tool)
        .description(description)
        .input_schema(input_schema)
        .build(move |ctx, args| execute::<A>(ctx, op, args))
}

/// Runs one tool invocation end to end.
pub async fn execute<A: ToolArgs>(
    ctx: ToolContext,
    op: &'static Operation,
    args: Value,
) -> ToolResult {
    let span = info_span!(
        "tool_call",
        tool = op.tool,
        request_id = %ctx.request_id,
        session_id = %ctx.session_id
    );

    async move {
        debug!("Starting {}", op.tool);

        let request = match prepare::<A>(op, args) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected arguments: {}", e);
                metrics::record_tool_call(op.tool, "invalid_arguments");
                return Ok(ToolsCallResult::error(format!(
                    "Invalid arguments for {}: {}",
                    op.tool, e
                )));
            }
        };

        match ctx.api.send(request).await {
            Ok(body) => {
                debug!("Completed {}", op.tool);
                metrics::record_tool_call(op.tool, "success");
                ToolsCallResult::json(&body).map_err(|e| McpError::InternalError(e.to_string()))
            }
            Err(e) => {
                warn!("{} failed: {}", op.tool, e);
                metrics::record_tool_call(op.tool, outcome_label(&e));
                Ok(ToolsCallResult::error(format_api_error(op, &e)))
            }
        }
    }
    .instrument(span)
    .await
}

fn prepare<A: ToolArgs>(op: &Operation, args: Value) -> Result<ApiRequest, ValidationError> {
    let args: A = serde_json::from_value(args)?;
    args.validate()?;
    let path = op.endpoint.render(&args.path_params())?;

    Ok(ApiRequest {
        method: op.endpoint.method,
        path,
        query: args.query(),
        body: args.body(),
    })
}

fn outcome_label(err: &ApiError) -> &'static str {
    match err {
        ApiError::MissingApiKey => "missing_api_key",
        ApiError::Transport(_) => "transport_error",
        ApiError::Upstream { .. } => "upstream_error",
        ApiError::InvalidResponse(_) => "invalid_response",
    }
}

/// Renders an upstream failure as the text of an error envelope.
pub fn format_api_error(op: &Operation, err: &ApiError) -> String {
    let ApiError::Upstream {
        status,
        message,
        details,
    } = err
    else {
        return format!("Error in {}: {}", op.tool, err);
    };

    let mut text = format!("Error in {} ({}): {}", op.tool, status, message);
    if let Some(details) = details {
        text.push_str("\nDetails: ");
        text.push_str(details);
    }
    if let Some((_, hint)) = STATUS_HINTS.iter().find(|(code, _)| code == status) {
        text.push_str("\n\n");
        text.push_str(hint);
    }
    if *status == 400 {
        if let Some(help) = op.bad_request_help {
            text.push_str("\n\n");
            text.push_str(help);
        }
    }
    text
}
