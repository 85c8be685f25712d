//! Query-related data models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One result row: column name to JSON value, in select-list order.
pub type ResultRow = serde_json::Map<String, JsonValue>;

/// Prefix turning any statement into a JSON-formatted plan request.
pub const EXPLAIN_PREFIX: &str = "EXPLAIN (FORMAT JSON) ";

/// Maximum query text length written to logs.
pub const LOGGED_QUERY_MAX_CHARS: usize = 200;

/// A positional parameter value for `$1`, `$2`, ... placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QueryParam {
    Null,
    Bool(bool),
    /// Stored as i64 for maximum range
    Int(i64),
    Float(f64),
    String(String),
    /// Arrays and objects, bound as `jsonb`
    Json(JsonValue),
}

impl QueryParam {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Json(_) => "json",
        }
    }
}

impl From<JsonValue> for QueryParam {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            JsonValue::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }
}

/// Truncate query text for logging, on a char boundary.
pub fn truncate_for_log(sql: &str) -> String {
    match sql.char_indices().nth(LOGGED_QUERY_MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}
