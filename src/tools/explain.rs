//! Query execution plan tool.
//!
//! `pg_explain` prefixes the statement with `EXPLAIN (FORMAT JSON)` and runs
//! it through the same read-only path as `pg_query`. The statement itself is
//! planned, not executed.

use crate::db::ConnectionManager;
use crate::error::DbResult;
use crate::models::{QueryParam, ResultRow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Input for the pg_explain tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExplainInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    /// SQL statement to explain
    pub query: String,
    /// Positional parameters for $1, $2, ... placeholders
    #[serde(default)]
    pub params: Vec<QueryParam>,
}

/// Output from the pg_explain tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExplainOutput {
    /// Rows as returned by the server, normally one row with a "QUERY PLAN" column
    pub plan: Vec<ResultRow>,
    /// Time taken to run EXPLAIN in milliseconds
    pub execution_time_ms: u64,
}

/// Handler for the pg_explain tool.
pub struct ExplainToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl ExplainToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn explain(&self, input: ExplainInput) -> DbResult<ExplainOutput> {
        let start = Instant::now();
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let plan = self
            .connection_manager
            .run_query_plan(&conn_id, &input.query, &input.params)
            .await?;
        Ok(ExplainOutput {
            plan,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_input_defaults() {
        let json = r#"{"conn_id": "conn1", "query": "SELECT 1"}"#;
        let input: ExplainInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.conn_id, "conn1");
        assert_eq!(input.query, "SELECT 1");
        assert!(input.params.is_empty());
    }

    #[test]
    fn test_explain_input_with_params() {
        let json =
            r#"{"conn_id": "conn1", "query": "SELECT * FROM t WHERE id = $1", "params": [123]}"#;
        let input: ExplainInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.params, vec![QueryParam::Int(123)]);
    }

    #[test]
    fn test_explain_input_requires_query() {
        let json = r#"{"conn_id": "conn1"}"#;
        assert!(serde_json::from_str::<ExplainInput>(json).is_err());
    }
}
