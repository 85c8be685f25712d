//! Scoped borrowing of a single pooled connection.
//!
//! A [`Lease`] that is released explicitly returns its connection to the
//! pool. A lease dropped any other way (the owning task was cancelled, a
//! timeout fired, or the body panicked) marks the connection to be closed
//! instead, so a connection in an unknown transaction state is never reused.

use crate::db::pool::PoolRegistry;
use crate::error::{DbError, DbResult};
use crate::models::ConnectionId;
use futures_util::future::BoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One borrowed connection.
pub struct Lease {
    conn_id: ConnectionId,
    conn: Option<PoolConnection<Postgres>>,
    statement_timeout: Duration,
    acquired_at: Instant,
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("conn_id", &self.conn_id)
            .field("held", &self.conn.is_some())
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl Lease {
    pub fn conn_id(&self) -> &ConnectionId {
        &self.conn_id
    }

    /// Client-side bound for one statement on this connection.
    pub fn statement_timeout(&self) -> Duration {
        self.statement_timeout
    }

    pub fn connection(&mut self) -> DbResult<&mut PgConnection> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| DbError::internal("lease already released"))
    }

    /// Return the connection to the pool.
    pub fn release(mut self) {
        if self.conn.take().is_some() {
            debug!(
                conn_id = %self.conn_id,
                held_ms = self.acquired_at.elapsed().as_millis() as u64,
                "Connection returned to pool"
            );
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            // Not released explicitly: the statement may still be running
            conn.close_on_drop();
            warn!(
                conn_id = %self.conn_id,
                "Lease dropped before completion, discarding connection"
            );
        }
    }
}

impl PoolRegistry {
    /// Borrow one connection, creating the pool if needed.
    pub async fn lease(&self, conn_id: &ConnectionId) -> DbResult<Lease> {
        let handle = self.acquire_pool(conn_id).await?;
        let conn = handle.pool().acquire().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => {
                DbError::lease_timeout(conn_id.to_string(), handle.acquire_timeout().as_secs())
            }
            sqlx::Error::PoolClosed => DbError::pool_released(conn_id.to_string()),
            other => DbError::from(other),
        })?;

        Ok(Lease {
            conn_id: *conn_id,
            conn: Some(conn),
            statement_timeout: handle.statement_timeout(),
            acquired_at: Instant::now(),
        })
    }

    /// Run `body` with one connection borrowed from the pool for `conn_id`.
    ///
    /// The connection goes back to the pool once `body` finishes, whether it
    /// succeeded or failed. If the returned future is dropped early the
    /// connection is discarded.
    pub async fn with_connection<T, F>(&self, conn_id: &ConnectionId, body: F) -> DbResult<T>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, DbResult<T>>,
    {
        let mut lease = self.lease(conn_id).await?;
        let result = body(lease.connection()?).await;
        lease.release();
        result
    }
}
