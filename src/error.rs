//! Error types for the PostgreSQL MCP server.
//!
//! Every failure the connection layer can produce is a [`DbError`] variant.
//! Variants carry enough context (identifier, SQLSTATE, suggestion) for a
//! client to decide whether to fix its input or simply try again.

use thiserror::Error;

/// `DbError` is `Clone` so a single failed pool creation can be handed to
/// every caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("Invalid connection descriptor: {message}")]
    InvalidDescriptor { message: String },

    #[error("Unknown connection ID: {conn_id}")]
    UnknownIdentifier { conn_id: String },

    #[error("Pool creation failed: {message}")]
    PoolCreation { message: String, suggestion: String },

    #[error("Query failed: {message}")]
    QueryExecution {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Timed out after {waited_secs}s waiting for a connection on {conn_id}")]
    LeaseTimeout { conn_id: String, waited_secs: u64 },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout { operation: String, elapsed_secs: u64 },

    #[error("Connection pool for {conn_id} was released")]
    PoolReleased { conn_id: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Create an unknown identifier error.
    pub fn unknown_identifier(conn_id: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            conn_id: conn_id.into(),
        }
    }

    /// Create a pool creation error with a helpful suggestion.
    pub fn pool_creation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::PoolCreation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a query execution error with optional SQL state.
    pub fn query_execution(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::QueryExecution {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    pub fn lease_timeout(conn_id: impl Into<String>, waited_secs: u64) -> Self {
        Self::LeaseTimeout {
            conn_id: conn_id.into(),
            waited_secs,
        }
    }

    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    pub fn pool_released(conn_id: impl Into<String>) -> Self {
        Self::PoolReleased {
            conn_id: conn_id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::PoolCreation { suggestion, .. } => Some(suggestion),
            Self::QueryExecution { suggestion, .. } => Some(suggestion),
            Self::UnknownIdentifier { .. } => {
                Some("Call 'connect' with the connection string to obtain a connection ID")
            }
            Self::LeaseTimeout { .. } => {
                Some("All pooled connections are busy; retry shortly or raise --max-connections")
            }
            Self::Timeout { .. } => {
                Some("Consider increasing --statement-timeout or optimizing the query")
            }
            Self::PoolReleased { .. } => Some("Retry the request; a fresh pool will be created"),
            _ => None,
        }
    }

    /// SQLSTATE reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::QueryExecution { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PoolCreation { .. }
                | Self::LeaseTimeout { .. }
                | Self::Timeout { .. }
                | Self::PoolReleased { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// Pool-level conditions that need the connection ID (`PoolTimedOut`,
/// `PoolClosed`) are mapped by the lease instead; here they fall back to
/// identifier-less variants.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::pool_creation(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                let suggestion = suggestion_for_sql_state(code.as_deref());
                DbError::query_execution(db_err.message(), code, suggestion)
            }
            sqlx::Error::RowNotFound => DbError::query_execution(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::lease_timeout("unknown", 0),
            sqlx::Error::PoolClosed => DbError::pool_released("unknown"),
            sqlx::Error::Io(io_err) => DbError::pool_creation(
                format!("network error talking to PostgreSQL: {io_err}"),
                "Check that the server is reachable from this host",
            ),
            sqlx::Error::Tls(tls_err) => DbError::pool_creation(
                format!("TLS handshake failed: {tls_err}"),
                "Check sslmode and certificates, or build with tls-native / tls-rustls",
            ),
            sqlx::Error::Protocol(msg) => DbError::pool_creation(
                format!("PostgreSQL protocol error: {msg}"),
                "The server sent an unexpected message; check its version",
            ),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("column {index} could not be decoded: {source}"))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("decode failed: {source}")),
            sqlx::Error::WorkerCrashed => DbError::internal("sqlx connection worker crashed"),
            other => DbError::internal(format!("unexpected driver error: {other}")),
        }
    }
}

fn suggestion_for_sql_state(code: Option<&str>) -> &'static str {
    match code {
        Some("25006") => "The connection is read-only; only SELECT, EXPLAIN and SHOW are allowed",
        Some("42P01") => "The table does not exist; list tables to check the name and schema",
        Some("42703") => "The column does not exist; describe the table to check column names",
        Some("42601") => "Check the SQL syntax",
        Some("42883") => "No function or operator matches these types; add explicit casts",
        Some("57014") => "The statement was cancelled, most likely by statement_timeout",
        Some(c) if c.starts_with("28") => "Check the user name and password",
        _ => "Check the SQL syntax and referenced objects",
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert DbError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        let data = suggestion_data(err.suggestion());
        match &err {
            DbError::InvalidDescriptor { .. } | DbError::InvalidInput { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), data)
            }

            DbError::UnknownIdentifier { .. } => {
                rmcp::ErrorData::resource_not_found(err.to_string(), data)
            }

            // Query errors carry the SQLSTATE in the message
            DbError::QueryExecution {
                message, sql_state, ..
            } => {
                let msg = match sql_state {
                    Some(code) => format!("{} (SQLSTATE: {})", message, code),
                    None => message.clone(),
                };
                rmcp::ErrorData::invalid_params(msg, data)
            }

            DbError::PoolCreation { .. }
            | DbError::LeaseTimeout { .. }
            | DbError::Timeout { .. }
            | DbError::PoolReleased { .. }
            | DbError::Internal { .. } => rmcp::ErrorData::internal_error(err.to_string(), data),
        }
    }
}
