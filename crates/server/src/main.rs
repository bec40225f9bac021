//! apibridge server: exposes one HTTP API's endpoints as MCP tools.
//!
//! Startup loads the config + tool-registry pair, builds the immutable
//! execution context (registry, credential provider, API client), and
//! serves the MCP streamable-HTTP transport plus a health endpoint until
//! interrupted.

mod config;
mod dispatcher;

use anyhow::Context as _;
use apibridge_api_tools::auth::CredentialProvider;
use apibridge_api_tools::client::ApiClient;
use apibridge_api_tools::registry::ToolRegistry;
use apibridge_api_tools::translate::ToolExecutor;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use dispatcher::Dispatcher;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "apibridge-server",
    about = "Serve one HTTP API's endpoints as MCP tools"
)]
struct Args {
    /// Server configuration file (JSON or YAML).
    #[arg(long, env = "APIBRIDGE_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Tool registry file (JSON or YAML).
    #[arg(long, env = "APIBRIDGE_TOOLS", default_value = "tools.json")]
    tools: PathBuf,

    /// Bind address override; defaults to the config file's host/port.
    #[arg(long, env = "APIBRIDGE_BIND")]
    bind: Option<SocketAddr>,

    /// Emit logs as JSON.
    #[arg(long, env = "APIBRIDGE_LOG_JSON")]
    log_json: bool,
}

/// Immutable per-process state shared with request handlers; built once at
/// startup and passed by reference, never held in globals.
#[derive(Clone)]
struct AppState {
    title: String,
    registry: Arc<ToolRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let cfg = config::load_config(&args.config)?;
    let tools = config::load_tools(&args.tools)?;

    let registry = Arc::new(ToolRegistry::new(tools).context("build tool registry")?);
    info!(server = %cfg.server_name, tool_count = registry.len(), "loaded configuration");

    let auth = CredentialProvider::new(cfg.auth_config.clone().unwrap_or_default());
    if !auth.is_configured() {
        warn!("no authentication configured; outbound requests will be unauthenticated");
    }

    let client = ApiClient::new(&cfg.base_url, auth).context("build API client")?;
    let executor = Arc::new(ToolExecutor::new(client, Arc::clone(&registry)));
    let dispatcher = Dispatcher::new(cfg.server_name.clone(), Arc::clone(&registry), executor);

    // Session state lives in the transport's session manager, keyed by
    // session id; every session gets its own clone of the dispatcher.
    let mcp_service = StreamableHttpService::new(
        move || Ok(dispatcher.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: true,
            ..StreamableHttpServerConfig::default()
        },
    );

    let state = AppState {
        title: cfg.server_name.clone(),
        registry: Arc::clone(&registry),
    };
    let router = Router::new()
        .route("/health", get(health))
        .with_state(state)
        .nest_service("/mcp", mcp_service);

    let listener = match args.bind {
        Some(addr) => tokio::net::TcpListener::bind(addr).await,
        None => tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port)).await,
    }
    .context("bind server address")?;
    let local_addr = listener.local_addr().context("read bound address")?;

    info!(server = %cfg.server_name, tools = registry.len(), "MCP server starting");
    info!("MCP endpoint:  http://{local_addr}/mcp");
    info!("Health check:  http://{local_addr}/health");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    info!("server stopped");
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "server": state.title,
        "tools_count": state.registry.len(),
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
