//! Configuration handling for the PostgreSQL MCP server.
//!
//! Server-wide settings come from CLI arguments and environment variables.
//! Pool settings can additionally be overridden per connection through
//! query parameters on the connection URL (`?max_connections=4`).

use clap::{Parser, ValueEnum};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 2;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Connection pool configuration options.
///
/// Unset fields fall back to the `DEFAULT_*` constants.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolOptions {
    /// Maximum connections in pool (default: 10)
    pub max_connections: Option<u32>,
    /// Minimum connections kept open (default: 2)
    pub min_connections: Option<u32>,
    /// Idle timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Per-statement timeout in seconds, enforced by the server and the client (default: 60)
    pub statement_timeout_secs: Option<u64>,
    /// Whether to test connections before use (default: true)
    pub test_before_acquire: Option<bool>,
}

impl PoolOptions {
    /// Pool option keys that we extract from URL query parameters.
    const URL_KEYS: &'static [&'static str] = &[
        "max_connections",
        "min_connections",
        "idle_timeout",
        "acquire_timeout",
        "statement_timeout",
        "test_before_acquire",
    ];

    pub fn max_connections_or_default(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Never exceeds the effective maximum.
    pub fn min_connections_or_default(&self) -> u32 {
        self.min_connections
            .unwrap_or(DEFAULT_MIN_CONNECTIONS)
            .min(self.max_connections_or_default())
    }

    pub fn idle_timeout_or_default(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS))
    }

    pub fn acquire_timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.acquire_timeout_secs
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        )
    }

    pub fn statement_timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.statement_timeout_secs
                .unwrap_or(DEFAULT_STATEMENT_TIMEOUT_SECS),
        )
    }

    pub fn test_before_acquire_or_default(&self) -> bool {
        self.test_before_acquire.unwrap_or(true)
    }

    /// Layer `overrides` on top of `self`, field by field.
    pub fn merged_with(&self, overrides: &PoolOptions) -> PoolOptions {
        PoolOptions {
            max_connections: overrides.max_connections.or(self.max_connections),
            min_connections: overrides.min_connections.or(self.min_connections),
            idle_timeout_secs: overrides.idle_timeout_secs.or(self.idle_timeout_secs),
            acquire_timeout_secs: overrides.acquire_timeout_secs.or(self.acquire_timeout_secs),
            statement_timeout_secs: overrides
                .statement_timeout_secs
                .or(self.statement_timeout_secs),
            test_before_acquire: overrides.test_before_acquire.or(self.test_before_acquire),
        }
    }

    /// Validate pool options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_connections {
            if max == 0 {
                return Err("max_connections must be greater than 0".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.min_connections, self.max_connections) {
            if min > max {
                return Err(format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    min, max
                ));
            }
        }
        for (name, value) in [
            ("idle_timeout", self.idle_timeout_secs),
            ("acquire_timeout", self.acquire_timeout_secs),
            ("statement_timeout", self.statement_timeout_secs),
        ] {
            if value == Some(0) {
                return Err(format!("{name} must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Strip pool option keys out of `url`, keeping other parameters for the driver.
    ///
    /// Unparsable values are ignored. Uses proper URL encoding to preserve special
    /// characters in the remaining parameters.
    pub fn extract_from_url(url: &mut Url) -> PoolOptions {
        let mut opts = HashMap::new();
        let remaining: Vec<(String, String)> = url
            .query_pairs()
            .filter_map(|(k, v)| {
                let key_lower = k.to_ascii_lowercase();
                if Self::URL_KEYS.contains(&key_lower.as_str()) {
                    opts.insert(key_lower, v.into_owned());
                    None
                } else {
                    Some((k.into_owned(), v.into_owned()))
                }
            })
            .collect();

        if remaining.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(remaining);
        }

        PoolOptions {
            max_connections: opts.remove("max_connections").and_then(|v| v.parse().ok()),
            min_connections: opts.remove("min_connections").and_then(|v| v.parse().ok()),
            idle_timeout_secs: opts.remove("idle_timeout").and_then(|v| v.parse().ok()),
            acquire_timeout_secs: opts.remove("acquire_timeout").and_then(|v| v.parse().ok()),
            statement_timeout_secs: opts
                .remove("statement_timeout")
                .and_then(|v| v.parse().ok()),
            test_before_acquire: opts.remove("test_before_acquire").and_then(|v| {
                if v.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if v.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }),
        }
    }
}

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the PostgreSQL MCP server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pg-mcp-server",
    about = "MCP server for PostgreSQL - pooled, read-only query access",
    version,
    author
)]
pub struct Config {
    /// Connection strings to register at startup.
    /// Their connection IDs are logged so clients can skip the 'connect' call.
    /// Can be specified multiple times.
    #[arg(
        short = 'd',
        long = "database",
        value_name = "URL",
        env = "PG_MCP_DATABASE",
        value_delimiter = ','
    )]
    pub databases: Vec<String>,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "PG_MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "PG_MCP_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "PG_MCP_HTTP_PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "PG_MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Maximum connections per pool
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS, env = "PG_MCP_MAX_CONNECTIONS")]
    pub max_connections: u32,

    /// Connections each pool keeps open
    #[arg(long, default_value_t = DEFAULT_MIN_CONNECTIONS, env = "PG_MCP_MIN_CONNECTIONS")]
    pub min_connections: u32,

    /// Seconds to wait for a free pooled connection
    #[arg(long, default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS, env = "PG_MCP_ACQUIRE_TIMEOUT")]
    pub acquire_timeout: u64,

    /// Seconds before an idle pooled connection is closed
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS, env = "PG_MCP_IDLE_TIMEOUT")]
    pub idle_timeout: u64,

    /// Per-statement timeout in seconds
    #[arg(long, default_value_t = DEFAULT_STATEMENT_TIMEOUT_SECS, env = "PG_MCP_STATEMENT_TIMEOUT")]
    pub statement_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "PG_MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "PG_MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            databases: Vec::new(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT_SECS,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Server-wide pool options, validated.
    pub fn pool_options(&self) -> Result<PoolOptions, String> {
        let options = PoolOptions {
            max_connections: Some(self.max_connections),
            min_connections: Some(self.min_connections),
            idle_timeout_secs: Some(self.idle_timeout),
            acquire_timeout_secs: Some(self.acquire_timeout),
            statement_timeout_secs: Some(self.statement_timeout),
            test_before_acquire: None,
        };
        options.validate()?;
        Ok(options)
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
