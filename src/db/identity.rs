//! Bidirectional mapping between connection descriptors and connection IDs.
//!
//! Mappings are only ever added. Releasing a pool leaves the mapping in
//! place so a later request with the same ID can transparently recreate it.

use crate::error::{DbError, DbResult};
use crate::models::{ConnectionDescriptor, ConnectionId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct Mappings {
    by_id: HashMap<ConnectionId, ConnectionDescriptor>,
    by_key: HashMap<String, ConnectionId>,
}

/// Registry of every descriptor seen by this process.
#[derive(Default)]
pub struct IdentifierMapper {
    mappings: RwLock<Mappings>,
}

impl IdentifierMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor and return its ID.
    ///
    /// Idempotent: a descriptor with an already known identity key returns the
    /// existing ID and keeps the first descriptor registered under it.
    pub async fn register(&self, descriptor: ConnectionDescriptor) -> ConnectionId {
        let conn_id = descriptor.identifier();

        {
            let mappings = self.mappings.read().await;
            if mappings.by_key.contains_key(descriptor.identity_key()) {
                debug!(conn_id = %conn_id, "Connection already registered");
                return conn_id;
            }
        }

        let mut mappings = self.mappings.write().await;
        // Double-check after acquiring write lock
        if !mappings.by_key.contains_key(descriptor.identity_key()) {
            info!(
                conn_id = %conn_id,
                descriptor = %descriptor,
                "Registered connection"
            );
            mappings
                .by_key
                .insert(descriptor.identity_key().to_string(), conn_id);
            mappings.by_id.insert(conn_id, descriptor);
        }
        conn_id
    }

    /// Look up the descriptor for an ID. No I/O is performed.
    pub async fn resolve(&self, conn_id: &ConnectionId) -> DbResult<ConnectionDescriptor> {
        self.mappings
            .read()
            .await
            .by_id
            .get(conn_id)
            .cloned()
            .ok_or_else(|| DbError::unknown_identifier(conn_id.to_string()))
    }

    /// Reverse lookup by identity key.
    pub async fn lookup(&self, identity_key: &str) -> Option<ConnectionId> {
        self.mappings.read().await.by_key.get(identity_key).copied()
    }

    pub async fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.mappings.read().await.by_id.contains_key(conn_id)
    }

    /// All registered connections, ordered by ID.
    pub async fn list(&self) -> Vec<(ConnectionId, ConnectionDescriptor)> {
        let mappings = self.mappings.read().await;
        let mut entries: Vec<_> = mappings
            .by_id
            .iter()
            .map(|(id, d)| (*id, d.clone()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    pub async fn len(&self) -> usize {
        self.mappings.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
