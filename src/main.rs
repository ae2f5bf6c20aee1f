//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration and starts the server with the
//! configured transport.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use ansible_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(config.logging.effective_level());

    let toolsets: Vec<&str> = config.toolsets.iter().map(|t| t.as_str()).collect();
    info!(
        "Starting {} v{} (toolsets: {})",
        config.server.name,
        config.server.version,
        toolsets.join(", ")
    );

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config);

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` directives take precedence over the configured level. Output
/// goes to stderr because stdout carries the STDIO transport.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
