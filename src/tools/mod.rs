//! MCP tool implementations.
//!
//! This module contains all tool handlers:
//! - `connection`: connect, disconnect and list_connections
//! - `query`: Execute read-only statements
//! - `explain`: Return EXPLAIN (FORMAT JSON) plans
//! - `catalog`: Schema, table, index, constraint and extension lookups

pub mod catalog;
pub mod connection;
pub mod explain;
pub mod query;

pub use catalog::{
    CatalogRowsOutput, CatalogToolHandler, ExtensionInput, ExtensionOutput, ListExtensionsInput,
    ListSchemasInput, ListTablesInput, RowCountOutput, SampleRowsInput, TableInput,
};
pub use connection::{
    ConnectInput, ConnectOutput, ConnectionToolHandler, DisconnectInput, ListConnectionsOutput,
};
pub use explain::{ExplainInput, ExplainOutput, ExplainToolHandler};
pub use query::{QueryInput, QueryOutput, QueryToolHandler};
