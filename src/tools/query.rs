//! Query execution tool.
//!
//! This module implements the `pg_query` MCP tool. Statements always run in a
//! read-only transaction; writes fail on the server with SQLSTATE 25006.

use crate::db::ConnectionManager;
use crate::error::DbResult;
use crate::models::{QueryParam, ResultRow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Input for the pg_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    /// SQL statement to execute. Use $1, $2, ... placeholders for parameters.
    pub query: String,
    /// Positional parameters for the placeholders
    #[serde(default)]
    pub params: Vec<QueryParam>,
}

/// Output from the pg_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct QueryOutput {
    /// Result rows as column-name to value maps, columns in select-list order
    pub rows: Vec<ResultRow>,
    /// Number of rows returned
    pub row_count: usize,
    /// Query execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryOutput {
    pub fn new(rows: Vec<ResultRow>, execution_time_ms: u64) -> Self {
        Self {
            row_count: rows.len(),
            rows,
            execution_time_ms,
        }
    }
}

/// Handler for the pg_query tool.
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl QueryToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn query(&self, input: QueryInput) -> DbResult<QueryOutput> {
        let start = Instant::now();
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .run_query(&conn_id, &input.query, &input.params)
            .await?;
        Ok(QueryOutput::new(rows, start.elapsed().as_millis() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolOptions;
    use crate::error::DbError;

    #[test]
    fn test_query_input_defaults() {
        let json = r#"{"conn_id": "abc", "query": "SELECT 1"}"#;
        let input: QueryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.conn_id, "abc");
        assert_eq!(input.query, "SELECT 1");
        assert!(input.params.is_empty());
    }

    #[test]
    fn test_query_input_with_params() {
        let json = r#"{"conn_id": "abc", "query": "SELECT $1, $2", "params": [123, "x"]}"#;
        let input: QueryInput = serde_json::from_str(json).unwrap();
        assert_eq!(
            input.params,
            vec![QueryParam::Int(123), QueryParam::String("x".into())]
        );
    }

    #[test]
    fn test_query_output_counts_rows() {
        let mut row = ResultRow::new();
        row.insert("one".into(), serde_json::json!(1));
        let output = QueryOutput::new(vec![row], 3);
        assert_eq!(output.row_count, 1);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["rows"], serde_json::json!([{"one": 1}]));
    }

    #[tokio::test]
    async fn test_query_unknown_connection() {
        let handler = QueryToolHandler::new(Arc::new(ConnectionManager::new(
            PoolOptions::default(),
        )));
        let err = handler
            .query(QueryInput {
                conn_id: "6ba7b811-9dad-11d1-80b4-00c04fd430c8".into(),
                query: "SELECT 1".into(),
                params: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownIdentifier { .. }));
    }
}
