//! Database access layer.
//!
//! This module provides:
//! - Connection ID derivation and lookup (`identity`)
//! - Single-flight pool management (`pool`)
//! - Scoped connection leases (`lease`)
//! - Read-only query execution (`executor`)
//! - Schema introspection (`catalog`)
//! - Row to JSON conversion (`types`)

pub mod catalog;
pub mod executor;
pub mod identity;
pub mod lease;
pub mod manager;
pub mod pool;
pub mod types;

pub use catalog::CatalogInspector;
pub use executor::QueryExecutor;
pub use identity::IdentifierMapper;
pub use lease::Lease;
pub use manager::{ConnectionManager, DisconnectOutcome};
pub use pool::{PgConnector, PoolConnector, PoolHandle, PoolRegistry, PoolTarget};
