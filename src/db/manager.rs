//! Entry point tying the mapper, pool registry and executor together.
//!
//! One `ConnectionManager` is built in `main` and shared through an `Arc`.

use crate::config::PoolOptions;
use crate::db::catalog::CatalogInspector;
use crate::db::executor::QueryExecutor;
use crate::db::identity::IdentifierMapper;
use crate::db::pool::{PoolConnector, PoolRegistry};
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionDescriptor, ConnectionId, ConnectionInfo, QueryParam, ResultRow};
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Outcome of a disconnect request. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct DisconnectOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ConnectionManager {
    mapper: Arc<IdentifierMapper>,
    registry: Arc<PoolRegistry>,
    executor: QueryExecutor,
    catalog: CatalogInspector,
}

impl ConnectionManager {
    /// Create a manager that opens real PostgreSQL pools.
    pub fn new(defaults: PoolOptions) -> Self {
        let mapper = Arc::new(IdentifierMapper::new());
        Self::from_registry(Arc::new(PoolRegistry::new(mapper, defaults)))
    }

    /// Create a manager over a custom pool connector.
    pub fn with_connector(defaults: PoolOptions, connector: Arc<dyn PoolConnector>) -> Self {
        let mapper = Arc::new(IdentifierMapper::new());
        Self::from_registry(Arc::new(PoolRegistry::with_connector(
            mapper, defaults, connector,
        )))
    }

    fn from_registry(registry: Arc<PoolRegistry>) -> Self {
        let executor = QueryExecutor::new(Arc::clone(&registry));
        Self {
            mapper: Arc::clone(registry.mapper()),
            catalog: CatalogInspector::new(executor.clone()),
            executor,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &CatalogInspector {
        &self.catalog
    }

    /// Validate a connection string and return its deterministic ID.
    ///
    /// Pool option overrides are checked here too, so a bad
    /// `max_connections` is reported now rather than on first use. No
    /// connection is opened; the pool is created on first use.
    pub async fn register_connection(&self, connection_string: &str) -> DbResult<ConnectionId> {
        let descriptor = ConnectionDescriptor::parse(connection_string)?;
        self.registry.target_for(descriptor.identifier(), &descriptor)?;
        Ok(self.mapper.register(descriptor).await)
    }

    /// Parse a client-supplied ID and check that it is registered.
    pub async fn resolve_id(&self, raw: &str) -> DbResult<ConnectionId> {
        let conn_id: ConnectionId = raw
            .parse()
            .map_err(|_| DbError::unknown_identifier(raw.trim()))?;
        if !self.mapper.contains(&conn_id).await {
            return Err(DbError::unknown_identifier(conn_id.to_string()));
        }
        Ok(conn_id)
    }

    /// Close the pool for `raw_id`, keeping the ID usable.
    pub async fn disconnect(&self, raw_id: &str) -> DisconnectOutcome {
        let conn_id = match self.resolve_id(raw_id).await {
            Ok(id) => id,
            Err(e) => {
                return DisconnectOutcome {
                    success: false,
                    error: Some(e.to_string()),
                };
            }
        };

        let had_pool = self.registry.release_pool(&conn_id).await;
        info!(conn_id = %conn_id, had_pool, "Disconnected");
        DisconnectOutcome {
            success: true,
            error: None,
        }
    }

    pub async fn run_query(
        &self,
        conn_id: &ConnectionId,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<ResultRow>> {
        self.executor.execute(conn_id, sql, params).await
    }

    pub async fn run_query_plan(
        &self,
        conn_id: &ConnectionId,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<ResultRow>> {
        self.executor.explain(conn_id, sql, params).await
    }

    /// Every registered connection with a masked descriptor.
    pub async fn list_connections(&self) -> Vec<ConnectionInfo> {
        let mut connections = Vec::new();
        for (conn_id, descriptor) in self.mapper.list().await {
            connections.push(ConnectionInfo {
                conn_id: conn_id.to_string(),
                descriptor: descriptor.masked(),
                database: descriptor.database().map(str::to_string),
                pool_active: self.registry.is_active(&conn_id).await,
            });
        }
        connections
    }

    /// Close every pool. Called once at shutdown.
    pub async fn release_all(&self) {
        self.registry.release_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_support::CountingConnector;
    use std::time::Duration;

    fn manager() -> (ConnectionManager, Arc<CountingConnector>) {
        let connector = CountingConnector::new(Duration::ZERO);
        (
            ConnectionManager::with_connector(PoolOptions::default(), connector.clone()),
            connector,
        )
    }

    #[tokio::test]
    async fn test_register_does_not_connect() {
        let (manager, connector) = manager();
        let id = manager
            .register_connection("user:pw@host:5432/db")
            .await
            .unwrap();
        assert_eq!(
            id,
            ConnectionId::for_identity_key("user:pw@host:5432/db")
        );
        assert_eq!(connector.calls(), 0);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_descriptor() {
        let (manager, _) = manager();
        let err = manager
            .register_connection("mysql://u@h/db")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidDescriptor { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_pool_override() {
        let (manager, connector) = manager();
        for raw in [
            "u:p@h/db?max_connections=0",
            "u:p@h/db?min_connections=9&max_connections=2",
        ] {
            let err = manager.register_connection(raw).await.unwrap_err();
            assert!(matches!(err, DbError::InvalidDescriptor { .. }), "{raw}");
        }
        assert!(manager.list_connections().await.is_empty());
        assert_eq!(connector.calls(), 0);

        let raw = "u:p@h/db?max_connections=4";
        let id = manager.register_connection(raw).await.unwrap();
        let descriptor = ConnectionDescriptor::parse(raw).unwrap();
        let target = manager.registry().target_for(id, &descriptor).unwrap();
        assert_eq!(target.options.max_connections_or_default(), 4);
    }

    #[tokio::test]
    async fn test_disconnect_unknown_identifier() {
        let (manager, _) = manager();
        let outcome = manager.disconnect("not-a-uuid").await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("Unknown connection ID"));

        let unregistered = ConnectionId::for_identity_key("u@h/db").to_string();
        let outcome = manager.disconnect(&unregistered).await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_disconnect_keeps_identifier_usable() {
        let (manager, connector) = manager();
        let id = manager.register_connection("u:p@h/db").await.unwrap();
        manager.registry().acquire_pool(&id).await.unwrap();

        let outcome = manager.disconnect(&id.to_string()).await;
        assert_eq!(
            outcome,
            DisconnectOutcome {
                success: true,
                error: None
            }
        );
        // Second disconnect is a no-op success
        assert!(manager.disconnect(&id.to_string()).await.success);

        manager.registry().acquire_pool(&id).await.unwrap();
        assert_eq!(connector.calls(), 2);
    }

    #[tokio::test]
    async fn test_list_connections_masks_password() {
        let (manager, _) = manager();
        let id = manager
            .register_connection("postgresql://u:hunter2@h/db")
            .await
            .unwrap();

        let listed = manager.list_connections().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].conn_id, id.to_string());
        assert_eq!(listed[0].database.as_deref(), Some("db"));
        assert!(!listed[0].pool_active);
        assert!(!listed[0].descriptor.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_resolve_id_trims_whitespace() {
        let (manager, _) = manager();
        let id = manager.register_connection("u:p@h/db").await.unwrap();
        let resolved = manager
            .resolve_id(&format!("  {id}\n"))
            .await
            .unwrap();
        assert_eq!(resolved, id);
    }
}
