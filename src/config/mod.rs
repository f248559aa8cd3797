mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.exa.ai/websets";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub exa_api_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub api_base_url: String,
    pub request_timeout_sec: u64,
    pub session_idle_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            exa_api_key: None,
            host: "0.0.0.0".to_string(),
            port: 7860,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_sec: 30,
            session_idle_timeout_sec: 1800,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub session_idle_timeout: Option<Duration>,

    // Upstream settings
    pub exa_api_key: Option<String>,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = match file.logging_level {
            Some(s) => parse_logging_level(&s)
                .with_context(|| format!("Invalid logging_level in config file: {}", s))?,
            None => cli.logging_level.clone(),
        };

        let exa_api_key = file
            .exa_api_key
            .or_else(|| cli.exa_api_key.clone())
            .filter(|key| !key.trim().is_empty());

        let api_base_url = file
            .api_base_url
            .unwrap_or_else(|| cli.api_base_url.clone());
        validate_base_url(&api_base_url)?;

        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        // 0 disables idle expiry
        let session_idle_timeout = match file
            .session_idle_timeout_sec
            .unwrap_or(cli.session_idle_timeout_sec)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            host,
            port,
            metrics_port,
            logging_level,
            session_idle_timeout,
            exa_api_key,
            api_base_url,
            request_timeout: Duration::from_secs(request_timeout_sec),
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
        }
    }
}

fn validate_base_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .with_context(|| format!("api_base_url is not a valid URL: {}", url))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        "http" | "https" => bail!("api_base_url has no host: {}", url),
        other => bail!("api_base_url must use http or https, got {}", other),
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
