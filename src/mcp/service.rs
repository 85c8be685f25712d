//! MCP service implementation using rmcp.
//!
//! This module defines the PgService struct with all PostgreSQL tools
//! exposed via the MCP protocol using the rmcp framework's macros.

use crate::db::{ConnectionManager, DisconnectOutcome};
use crate::error::DbResult;
use crate::tools::catalog::{
    CatalogRowsOutput, CatalogToolHandler, ExtensionInput, ExtensionOutput, ListExtensionsInput,
    ListSchemasInput, ListTablesInput, RowCountOutput, SampleRowsInput, TableInput,
};
use crate::tools::connection::{
    ConnectInput, ConnectOutput, ConnectionToolHandler, DisconnectInput, ListConnectionsOutput,
};
use crate::tools::explain::{ExplainInput, ExplainOutput, ExplainToolHandler};
use crate::tools::query::{QueryInput, QueryOutput, QueryToolHandler};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct PgService {
    /// Shared connection manager for all database operations
    connection_manager: Arc<ConnectionManager>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl PgService {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self {
            connection_manager,
            tool_router: Self::tool_router(),
        }
    }

    /// Ensure a conn_id is provided and non-empty, returning it trimmed.
    fn validate_conn_id(&self, provided: &str) -> Result<String, McpError> {
        let trimmed = provided.trim();
        if trimmed.is_empty() {
            Err(McpError::invalid_params(
                "conn_id is required. Call connect or list_connections first to get a connection ID.",
                None,
            ))
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn catalog(&self) -> CatalogToolHandler {
        CatalogToolHandler::new(self.connection_manager.clone())
    }
}

fn respond<T>(result: DbResult<T>) -> Result<Json<T>, McpError> {
    result.map(Json).map_err(McpError::from)
}

#[tool_router]
impl PgService {
    #[tool(
        description = "Register a PostgreSQL connection string and return its connection ID.\nThe ID is derived from the credentials, host, port and database, so the same string always yields the same ID.\nNo connection is opened until the ID is first used."
    )]
    async fn connect(
        &self,
        Parameters(input): Parameters<ConnectInput>,
    ) -> Result<Json<ConnectOutput>, McpError> {
        let handler = ConnectionToolHandler::new(self.connection_manager.clone());
        respond(handler.connect(input).await)
    }

    #[tool(
        description = "Close the connection pool for a connection ID.\nThe ID stays valid; the next query opens a fresh pool."
    )]
    async fn disconnect(
        &self,
        Parameters(input): Parameters<DisconnectInput>,
    ) -> Result<Json<DisconnectOutcome>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        let handler = ConnectionToolHandler::new(self.connection_manager.clone());
        Ok(Json(handler.disconnect(input).await))
    }

    #[tool(
        description = "List registered connections with masked connection strings and whether a pool is currently open."
    )]
    async fn list_connections(&self) -> Json<ListConnectionsOutput> {
        let handler = ConnectionToolHandler::new(self.connection_manager.clone());
        Json(handler.list_connections().await)
    }

    #[tool(
        description = "Execute a SQL statement in a read-only transaction and return rows as JSON objects.\nUse $1, $2, ... placeholders with the params array.\nWrites are rejected by the server (SQLSTATE 25006)."
    )]
    async fn pg_query(
        &self,
        Parameters(input): Parameters<QueryInput>,
    ) -> Result<Json<QueryOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        let handler = QueryToolHandler::new(self.connection_manager.clone());
        respond(handler.query(input).await)
    }

    #[tool(
        description = "Show the execution plan for a statement as EXPLAIN (FORMAT JSON) output.\nThe statement is planned, not executed."
    )]
    async fn pg_explain(
        &self,
        Parameters(input): Parameters<ExplainInput>,
    ) -> Result<Json<ExplainOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        let handler = ExplainToolHandler::new(self.connection_manager.clone());
        respond(handler.explain(input).await)
    }

    #[tool(description = "List user schemas with owner and description.")]
    async fn list_schemas(
        &self,
        Parameters(input): Parameters<ListSchemasInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().list_schemas(input).await)
    }

    #[tool(description = "List tables, views and materialized views in a schema (default: public).")]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().list_tables(input).await)
    }

    #[tool(
        description = "Describe the columns of a table: type, nullability, default and comment, in ordinal order."
    )]
    async fn describe_columns(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().describe_columns(input).await)
    }

    #[tool(description = "List indexes on a table with their definitions.")]
    async fn list_indexes(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().list_indexes(input).await)
    }

    #[tool(
        description = "List primary key, foreign key, unique, check and exclusion constraints on a table."
    )]
    async fn list_constraints(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().list_constraints(input).await)
    }

    #[tool(description = "List installed extensions, optionally only those in one schema.")]
    async fn list_extensions(
        &self,
        Parameters(input): Parameters<ListExtensionsInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().list_extensions(input).await)
    }

    #[tool(
        description = "Show one installed extension: version, schema, whether an update is available, and the objects it owns."
    )]
    async fn get_extension(
        &self,
        Parameters(input): Parameters<ExtensionInput>,
    ) -> Result<Json<ExtensionOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().get_extension(input).await)
    }

    #[tool(
        description = "Estimate a table's row count from planner statistics without scanning it.\nReturns null when the table has never been analyzed."
    )]
    async fn row_count(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<RowCountOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().row_count(input).await)
    }

    #[tool(description = "Return the first rows of a table (default 10, at most 100).")]
    async fn sample_rows(
        &self,
        Parameters(input): Parameters<SampleRowsInput>,
    ) -> Result<Json<CatalogRowsOutput>, McpError> {
        let mut input = input;
        input.conn_id = self.validate_conn_id(&input.conn_id)?;
        respond(self.catalog().sample_rows(input).await)
    }
}

#[tool_handler]
impl ServerHandler for PgService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pg-mcp-server".to_owned(),
                title: Some("PostgreSQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only PostgreSQL tools.\n\
                \n\
                ## Workflow\n\
                1. Call `connect` with a connection string, or `list_connections` for\n\
                   connections registered at startup\n\
                2. Pass the returned `conn_id` to every other tool\n\
                3. Call `disconnect` to close the pool; the `conn_id` keeps working\n\
                \n\
                ## Queries\n\
                - `pg_query` runs inside a read-only transaction; writes fail with SQLSTATE 25006\n\
                - Use `$1`, `$2`, ... placeholders and the `params` array for values\n\
                - `pg_explain` returns the plan without running the statement\n\
                \n\
                ## Schema\n\
                - `list_schemas`, `list_tables`, `describe_columns`, `list_indexes`,\n\
                  `list_constraints`, `list_extensions`, `get_extension`, `row_count`,\n\
                  `sample_rows`\n\
                - `schema` defaults to `public`"
                    .to_string(),
            ),
        }
    }
}
