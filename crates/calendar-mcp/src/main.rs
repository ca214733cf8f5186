//! Calendar MCP Server
//!
//! Spawned by an MCP client for read-only access to macOS Calendar events.
//! Communicates via stdio JSON-RPC, so nothing may be logged to stdout.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use calendar_mcp_core::config::Config;
use calendar_mcp_core::mcp::McpServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first to get log path
    let loaded = Config::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    // Set up file logging with timestamps
    let log_dir = config.logs_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "mcp.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(file_layer.with_filter(filter))
        .init();

    info!("Calendar MCP server starting");

    if let Err(e) = loaded {
        warn!("Failed to load config, using defaults: {}", e);
    }

    let db_path = config.calendar_db_path();
    if !db_path.exists() {
        // Tool calls will report the open failure to the client
        warn!("Calendar store not found at {:?}", db_path);
    }

    let server = McpServer::new(Arc::new(config));
    server.run().await?;

    info!("Calendar MCP server stopped");
    Ok(())
}
