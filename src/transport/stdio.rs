//! Stdio transport for the MCP server.
//!
//! This transport uses standard input/output for communication,
//! which is the standard mode for CLI-based MCP integrations. Logs go to
//! stderr so they never interleave with protocol messages.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::PgService;
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::{info, warn};

pub struct StdioTransport {
    connection_manager: Arc<ConnectionManager>,
}

impl StdioTransport {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = PgService::new(self.connection_manager.clone());
        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {e}")))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                if let Err(e) = result {
                    warn!(error = %e, "Stdio transport error");
                    self.connection_manager.release_all().await;
                    return Err(DbError::internal(format!("Stdio transport error: {e}")));
                }
                info!("Stdio transport completed normally");
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Releasing all connection pools");
        self.connection_manager.release_all().await;

        if shutdown_requested {
            // A blocking stdin read cannot be cancelled, so leave explicitly.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolOptions;

    #[test]
    fn test_stdio_transport_creation() {
        let manager = Arc::new(ConnectionManager::new(PoolOptions::default()));
        let transport = StdioTransport::new(manager);
        assert_eq!(transport.name(), "stdio");
    }
}
