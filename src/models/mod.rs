//! Data models for the PostgreSQL MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{ConnectionDescriptor, ConnectionId, ConnectionInfo, DescriptorError};
pub use query::{EXPLAIN_PREFIX, QueryParam, ResultRow, truncate_for_log};
