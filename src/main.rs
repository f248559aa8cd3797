use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use websets_mcp_server::config::{self, DEFAULT_API_BASE_URL};
use websets_mcp_server::mcp::build_registry;
use websets_mcp_server::server::{run_server, RequestsLoggingLevel, SessionRouter};
use websets_mcp_server::websets::{WebsetsApi, WebsetsClient};

#[derive(Parser, Debug)]
#[command(version, about = "MCP server exposing the Exa Websets API as tools")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Exa API key sent as x-api-key on every upstream call.
    #[clap(long, env = "EXA_API_KEY", hide_env_values = true)]
    pub exa_api_key: Option<String>,

    /// The address to bind.
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 7860)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping). 0 disables it.
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the Websets API.
    #[clap(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Timeout in seconds for each upstream request.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_sec: u64,

    /// Seconds of inactivity after which a session is dropped. 0 keeps sessions forever.
    #[clap(long, default_value_t = 1800)]
    pub session_idle_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            exa_api_key: args.exa_api_key.clone(),
            host: args.host.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            api_base_url: args.api_base_url.clone(),
            request_timeout_sec: args.request_timeout_sec,
            session_idle_timeout_sec: args.session_idle_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    info!("websets-mcp-server v{}", env!("CARGO_PKG_VERSION"));

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  listen: {}:{}", app_config.host, app_config.port);
    info!("  api_base_url: {}", app_config.api_base_url);
    info!("  request_timeout: {:?}", app_config.request_timeout);
    match app_config.session_idle_timeout {
        Some(timeout) => info!("  session_idle_timeout: {:?}", timeout),
        None => info!("  session_idle_timeout: never"),
    }

    if app_config.exa_api_key.is_none() {
        warn!("EXA_API_KEY is not set: every tool call will fail until it is configured");
    }

    let client = WebsetsClient::new(
        &app_config.api_base_url,
        app_config.exa_api_key.clone(),
        app_config.request_timeout,
    )
    .context("Failed to build Websets API client")?;
    let api: Arc<dyn WebsetsApi> = Arc::new(client);

    let router = SessionRouter::new(
        Arc::new(build_registry()),
        api,
        app_config.session_idle_timeout,
    );

    run_server(app_config.server_config(), router).await
}
