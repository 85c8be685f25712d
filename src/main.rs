//! PostgreSQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to run read-only queries against PostgreSQL databases.

use clap::Parser;
use pg_mcp_server::config::{Config, TransportMode};
use pg_mcp_server::db::ConnectionManager;
use pg_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber. Output goes to stderr; stdout carries
/// the stdio protocol stream.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting PostgreSQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool_options = config.pool_options()?;
    let connection_manager = Arc::new(ConnectionManager::new(pool_options));

    // Pools open lazily; this only validates and assigns IDs.
    for database in &config.databases {
        let conn_id = connection_manager.register_connection(database).await?;
        info!(conn_id = %conn_id, "Registered startup connection");
    }

    let result = match config.transport {
        TransportMode::Stdio => {
            let transport = StdioTransport::new(connection_manager);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                addr = %config.http_bind_addr(),
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                connection_manager,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
