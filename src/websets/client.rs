//! HTTP client for the Exa Websets API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::debug;

use super::endpoints::HttpMethod;
use super::error::ApiError;
use crate::server::metrics;

/// Header carrying the API credential on every upstream call.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A fully resolved upstream call: the path is already rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Anything that can execute a Websets API call.
///
/// The real implementation is [`WebsetsClient`]; tests substitute recording fakes.
#[async_trait]
pub trait WebsetsApi: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// HTTP client for the Websets API.
pub struct WebsetsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WebsetsClient {
    /// Create a new Websets client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.exa.ai/websets")
    /// * `api_key` - Credential sent as `x-api-key`; absence is reported per call
    /// * `timeout` - Request timeout applied to every call
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        let api_key = api_key.filter(|key| !key.trim().is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WebsetsApi for WebsetsClient {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(API_KEY_HEADER, api_key);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("{} {}", request.method, url);
        let start = Instant::now();
        let response = builder.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        metrics::record_upstream_request(request.method.as_str(), start.elapsed());
        debug!("{} {} -> {}", request.method, url, status);

        let text = response.text().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            return Err(ApiError::from_upstream(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(json!({ "success": true, "status": status.as_u16() }));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
