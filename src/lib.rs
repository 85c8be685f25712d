//! PostgreSQL MCP Server Library
//!
//! MCP (Model Context Protocol) tools for AI assistants to run read-only
//! queries against PostgreSQL. Connection strings map to deterministic IDs,
//! each ID owns a lazily created pool, and every statement runs in a
//! read-only transaction on a leased connection.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::{Config, PoolOptions};
pub use db::ConnectionManager;
pub use error::{DbError, DbResult};
pub use mcp::PgService;
pub use models::{ConnectionDescriptor, ConnectionId, QueryParam};
