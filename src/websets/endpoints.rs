//! Upstream endpoints of the Websets API, relative to the configured base URL.

use std::fmt;

/// HTTP verbs used by the Websets API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A method plus a path template such as `/v0/websets/{websetId}/items/{itemId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

/// Reasons a path template could not be filled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("{0} must not be empty")]
    EmptyParam(String),
    #[error("missing value for path parameter {0}")]
    MissingParam(String),
    #[error("unterminated placeholder in path template {0}")]
    Malformed(&'static str),
}

impl Endpoint {
    pub const fn get(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
        }
    }

    pub const fn patch(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Patch,
            path,
        }
    }

    pub const fn delete(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Delete,
            path,
        }
    }

    /// Substitutes every `{name}` placeholder with its percent-encoded value.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, PathError> {
        let mut rendered = String::with_capacity(self.path.len() + 32);
        let mut rest = self.path;

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or(PathError::Malformed(self.path))?;
            let name = &after[..close];

            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| PathError::MissingParam(name.to_string()))?;
            if value.trim().is_empty() {
                return Err(PathError::EmptyParam(name.to_string()));
            }
            rendered.push_str(&urlencoding::encode(value));

            rest = &after[close + 1..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }
}

pub const CREATE_WEBSET: Endpoint = Endpoint::post("/v0/websets");
pub const PREVIEW_WEBSET: Endpoint = Endpoint::post("/v0/websets/preview");
pub const GET_WEBSET: Endpoint = Endpoint::get("/v0/websets/{id}");
pub const LIST_WEBSETS: Endpoint = Endpoint::get("/v0/websets");
pub const UPDATE_WEBSET: Endpoint = Endpoint::post("/v0/websets/{id}");
pub const DELETE_WEBSET: Endpoint = Endpoint::delete("/v0/websets/{id}");
pub const CANCEL_WEBSET: Endpoint = Endpoint::post("/v0/websets/{id}/cancel");

pub const CREATE_SEARCH: Endpoint = Endpoint::post("/v0/websets/{websetId}/searches");
pub const GET_SEARCH: Endpoint = Endpoint::get("/v0/websets/{websetId}/searches/{searchId}");
pub const CANCEL_SEARCH: Endpoint =
    Endpoint::post("/v0/websets/{websetId}/searches/{searchId}/cancel");

pub const CREATE_ENRICHMENT: Endpoint = Endpoint::post("/v0/websets/{websetId}/enrichments");
pub const GET_ENRICHMENT: Endpoint =
    Endpoint::get("/v0/websets/{websetId}/enrichments/{enrichmentId}");
pub const UPDATE_ENRICHMENT: Endpoint =
    Endpoint::patch("/v0/websets/{websetId}/enrichments/{enrichmentId}");
pub const DELETE_ENRICHMENT: Endpoint =
    Endpoint::delete("/v0/websets/{websetId}/enrichments/{enrichmentId}");
pub const CANCEL_ENRICHMENT: Endpoint =
    Endpoint::post("/v0/websets/{websetId}/enrichments/{enrichmentId}/cancel");

pub const LIST_ITEMS: Endpoint = Endpoint::get("/v0/websets/{websetId}/items");
pub const GET_ITEM: Endpoint = Endpoint::get("/v0/websets/{websetId}/items/{itemId}");
pub const DELETE_ITEM: Endpoint = Endpoint::delete("/v0/websets/{websetId}/items/{itemId}");

pub const CREATE_MONITOR: Endpoint = Endpoint::post("/v0/monitors");
pub const GET_MONITOR: Endpoint = Endpoint::get("/v0/monitors/{id}");
pub const LIST_MONITORS: Endpoint = Endpoint::get("/v0/monitors");
pub const UPDATE_MONITOR: Endpoint = Endpoint::patch("/v0/monitors/{id}");
pub const DELETE_MONITOR: Endpoint = Endpoint::delete("/v0/monitors/{id}");
pub const LIST_MONITOR_RUNS: Endpoint = Endpoint::get("/v0/monitors/{monitorId}/runs");
pub const GET_MONITOR_RUN: Endpoint = Endpoint::get("/v0/monitors/{monitorId}/runs/{runId}");

pub const CREATE_WEBHOOK: Endpoint = Endpoint::post("/v0/webhooks");
pub const GET_WEBHOOK: Endpoint = Endpoint::get("/v0/webhooks/{id}");
pub const LIST_WEBHOOKS: Endpoint = Endpoint::get("/v0/webhooks");
pub const UPDATE_WEBHOOK: Endpoint = Endpoint::patch("/v0/webhooks/{id}");
pub const DELETE_WEBHOOK: Endpoint = Endpoint::delete("/v0/webhooks/{id}");
pub const LIST_WEBHOOK_ATTEMPTS: Endpoint = Endpoint::get("/v0/webhooks/{id}/attempts");

pub const LIST_EVENTS: Endpoint = Endpoint::get("/v0/events");
pub const GET_EVENT: Endpoint = Endpoint::get("/v0/events/{id}");
