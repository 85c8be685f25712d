//! Read-only query execution.
//!
//! Every query runs on a leased connection inside its own transaction that
//! is explicitly marked `READ ONLY`, on top of the session default set when
//! the pool was created. Rows are fetched eagerly and converted to ordered
//! JSON maps before the connection is returned.

use crate::db::pool::PoolRegistry;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionId, EXPLAIN_PREFIX, QueryParam, ResultRow, truncate_for_log};
use sqlx::postgres::PgArguments;
use sqlx::types::Json;
use sqlx::{Connection, PgConnection, Postgres};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Executes statements against registered connections.
#[derive(Clone)]
pub struct QueryExecutor {
    registry: Arc<PoolRegistry>,
}

impl QueryExecutor {
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        Self { registry }
    }

    /// Run `sql` with positional `params` and return every row.
    ///
    /// Failures are logged with the connection ID and a truncated copy of the
    /// query text, then returned; nothing is retried.
    pub async fn execute(
        &self,
        conn_id: &ConnectionId,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<ResultRow>> {
        let start = Instant::now();
        let mut lease = self.registry.lease(conn_id).await?;
        let limit = lease.statement_timeout();

        debug!(
            conn_id = %conn_id,
            sql = %truncate_for_log(sql),
            params = params.len(),
            "Executing query"
        );

        let outcome = timeout(limit, run_read_only(lease.connection()?, sql, params)).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(rows)) => {
                lease.release();
                info!(
                    conn_id = %conn_id,
                    rows = rows.len(),
                    elapsed_ms,
                    "Query completed"
                );
                Ok(rows)
            }
            Ok(Err(e)) => {
                lease.release();
                warn!(
                    conn_id = %conn_id,
                    sql = %truncate_for_log(sql),
                    sql_state = ?e.sql_state(),
                    error = %e,
                    "Query failed"
                );
                Err(e)
            }
            Err(_) => {
                // Dropping the lease discards the connection mid-statement
                drop(lease);
                warn!(
                    conn_id = %conn_id,
                    sql = %truncate_for_log(sql),
                    timeout_secs = limit.as_secs(),
                    "Query timed out"
                );
                Err(DbError::timeout("query", limit.as_secs()))
            }
        }
    }

    /// Run `EXPLAIN (FORMAT JSON)` for `sql` and return the plan rows unchanged.
    pub async fn explain(
        &self,
        conn_id: &ConnectionId,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<ResultRow>> {
        let explain_sql = format!("{EXPLAIN_PREFIX}{sql}");
        self.execute(conn_id, &explain_sql, params).await
    }
}

/// Begin, mark read-only, fetch, commit. Rolls back on any query error.
async fn run_read_only(
    conn: &mut PgConnection,
    sql: &str,
    params: &[QueryParam],
) -> DbResult<Vec<ResultRow>> {
    let mut tx = conn.begin().await.map_err(statement_error)?;
    sqlx::query("SET TRANSACTION READ ONLY")
        .execute(&mut *tx)
        .await
        .map_err(statement_error)?;

    let query = params
        .iter()
        .fold(sqlx::query(sql), |query, param| bind_param(query, param));

    match query.fetch_all(&mut *tx).await {
        Ok(rows) => {
            tx.commit().await.map_err(statement_error)?;
            Ok(rows.iter().map(|row| row.to_json_map()).collect())
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                debug!(error = %rollback_err, "Rollback after failed query also failed");
            }
            Err(statement_error(e))
        }
    }
}

/// Map a driver error raised on an already leased connection.
///
/// Transport failures here are statement failures, not pool-creation ones:
/// the statement may have reached the server, so they are never retryable.
fn statement_error(err: sqlx::Error) -> DbError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_) => {
            DbError::query_execution(
                format!("Connection failed during the statement: {err}"),
                None,
                "The statement was not resent; check the server and run it again if it is safe to",
            )
        }
        other => other.into(),
    }
}

/// Bind a parameter to a PostgreSQL query.
pub(crate) fn bind_param<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
        QueryParam::Json(v) => query.bind(Json(v)),
    }
}
