//! Errors produced while talking to the Websets API.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API key was configured. Reported on every call, never retried.
    #[error(
        "Missing EXA_API_KEY: Please provide an API key via the --exa-api-key option, \
         the exa_api_key config entry or the EXA_API_KEY environment variable. \
         Get your API key at https://dashboard.exa.ai/api-keys"
    )]
    MissingApiKey,

    /// No response was received (DNS, connection refused, timeout, broken body).
    #[error("{0}")]
    Transport(String),

    /// The upstream API answered with a non-success status.
    #[error("upstream responded with status {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// The upstream API answered with a success status but an unreadable body.
    #[error("Invalid response from Websets API: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Builds a transport error keeping the whole source chain, so that
    /// "error sending request" also says *why* the request failed.
    pub fn transport(err: reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        if err.is_timeout() && !message.contains("timed out") {
            message.push_str(" (request timed out)");
        }
        ApiError::Transport(message)
    }

    /// Builds an upstream error from a non-success status and the raw body.
    ///
    /// The Websets API reports `{"message": ..., "details": ...}`; some gateways
    /// answer with `{"error": ...}` or plain text instead.
    pub fn from_upstream(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message").or_else(|| v.get("error")))
            .and_then(|m| match m {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .or_else(|| {
                let trimmed = body.trim();
                (parsed.is_none() && !trimmed.is_empty() && trimmed.len() <= 512)
                    .then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        let details = parsed
            .as_ref()
            .and_then(|v| v.get("details"))
            .and_then(|d| match d {
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            });

        ApiError::Upstream {
            status: status.as_u16(),
            message,
            details,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
