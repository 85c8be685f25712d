//! Schema introspection tools.
//!
//! Thin wrappers over [`CatalogInspector`]; each returns the catalog rows
//! as-is together with a count.

use crate::db::ConnectionManager;
use crate::error::DbResult;
use crate::models::ResultRow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

fn default_schema() -> String {
    "public".to_string()
}

/// Input for tools that take only a connection.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListSchemasInput {
    /// Connection ID returned by connect
    pub conn_id: String,
}

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    /// Schema to list. Default: public
    #[serde(default = "default_schema")]
    pub schema: String,
}

/// Input for tools that inspect a single table.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    /// Schema containing the table. Default: public
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Table, view or materialized view name (unquoted)
    pub table: String,
}

/// Input for the sample_rows tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SampleRowsInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
    /// Number of rows to return, 1 to 100. Default: 10
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Input for the list_extensions tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListExtensionsInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    /// Only list extensions installed in this schema
    #[serde(default)]
    pub schema: Option<String>,
}

/// Input for the get_extension tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtensionInput {
    /// Connection ID returned by connect
    pub conn_id: String,
    /// Extension name, e.g. pg_trgm
    pub name: String,
    /// Only match the extension if it is installed in this schema
    #[serde(default)]
    pub schema: Option<String>,
}

/// Rows returned by a catalog lookup.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CatalogRowsOutput {
    pub rows: Vec<ResultRow>,
    pub count: usize,
}

impl From<Vec<ResultRow>> for CatalogRowsOutput {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self {
            count: rows.len(),
            rows,
        }
    }
}

/// Output from the row_count tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RowCountOutput {
    pub schema: String,
    pub table: String,
    /// False when no such table exists
    pub found: bool,
    /// Planner estimate; null when the table was never analyzed
    pub approximate_rows: Option<i64>,
    /// Table size including indexes and TOAST
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<i64>,
}

impl RowCountOutput {
    fn from_row(schema: String, table: String, row: Option<ResultRow>) -> Self {
        let field = |name: &str| row.as_ref().and_then(|r| r.get(name)).and_then(JsonValue::as_i64);
        Self {
            found: row.is_some(),
            approximate_rows: field("approximate_rows"),
            total_bytes: field("total_bytes"),
            schema,
            table,
        }
    }
}

/// Output from the get_extension tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExtensionOutput {
    pub name: String,
    /// False when the extension is not installed
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ResultRow>,
}

/// Handler for the catalog tools.
pub struct CatalogToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl CatalogToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn list_schemas(&self, input: ListSchemasInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self.connection_manager.catalog().list_schemas(&conn_id).await?;
        Ok(rows.into())
    }

    pub async fn list_tables(&self, input: ListTablesInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .catalog()
            .list_tables(&conn_id, &input.schema)
            .await?;
        Ok(rows.into())
    }

    pub async fn describe_columns(&self, input: TableInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .catalog()
            .list_columns(&conn_id, &input.schema, &input.table)
            .await?;
        Ok(rows.into())
    }

    pub async fn list_indexes(&self, input: TableInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .catalog()
            .list_indexes(&conn_id, &input.schema, &input.table)
            .await?;
        Ok(rows.into())
    }

    pub async fn list_constraints(&self, input: TableInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .catalog()
            .list_constraints(&conn_id, &input.schema, &input.table)
            .await?;
        Ok(rows.into())
    }

    pub async fn list_extensions(&self, input: ListExtensionsInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .catalog()
            .list_extensions(&conn_id, input.schema.as_deref())
            .await?;
        Ok(rows.into())
    }

    pub async fn get_extension(&self, input: ExtensionInput) -> DbResult<ExtensionOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let extension = self
            .connection_manager
            .catalog()
            .get_extension(&conn_id, &input.name, input.schema.as_deref())
            .await?;
        Ok(ExtensionOutput {
            name: input.name,
            found: extension.is_some(),
            extension,
        })
    }

    pub async fn row_count(&self, input: TableInput) -> DbResult<RowCountOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let row = self
            .connection_manager
            .catalog()
            .approximate_row_count(&conn_id, &input.schema, &input.table)
            .await?;
        Ok(RowCountOutput::from_row(input.schema, input.table, row))
    }

    pub async fn sample_rows(&self, input: SampleRowsInput) -> DbResult<CatalogRowsOutput> {
        let conn_id = self.connection_manager.resolve_id(&input.conn_id).await?;
        let rows = self
            .connection_manager
            .catalog()
            .sample_rows(&conn_id, &input.schema, &input.table, input.limit)
            .await?;
        Ok(rows.into())
    }
}
