//! Connection-related data models.
//!
//! A [`ConnectionDescriptor`] is the PostgreSQL URL a client hands us. A
//! [`ConnectionId`] is the opaque token derived from it and handed back.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

/// Scheme every descriptor is canonicalized to.
pub const CANONICAL_SCHEME: &str = "postgresql";

const SCHEME_SEPARATOR: &str = "://";

/// A validated, canonical PostgreSQL connection URL.
///
/// Contains credentials: `Debug` and `Display` only ever show the masked form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionDescriptor {
    canonical: String,
    database: Option<String>,
    host: Option<String>,
}

impl ConnectionDescriptor {
    /// Canonicalize and validate a raw connection string.
    ///
    /// `user:pw@host:5432/db` becomes `postgresql://user:pw@host:5432/db`;
    /// `postgres://` is rewritten to `postgresql://`. Any other scheme is rejected.
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let canonical = match trimmed.find(SCHEME_SEPARATOR) {
            Some(pos) => {
                let scheme = &trimmed[..pos];
                if scheme.eq_ignore_ascii_case("postgresql") || scheme.eq_ignore_ascii_case("postgres")
                {
                    format!("{CANONICAL_SCHEME}{}", &trimmed[pos..])
                } else {
                    return Err(DescriptorError::UnsupportedScheme(scheme.to_string()));
                }
            }
            None => format!("{CANONICAL_SCHEME}{SCHEME_SEPARATOR}{trimmed}"),
        };

        let url = Url::parse(&canonical).map_err(|e| DescriptorError::Malformed(e.to_string()))?;

        let descriptor = Self {
            database: database_from_path(url.path()),
            host: url.host_str().filter(|h| !h.is_empty()).map(str::to_string),
            canonical,
        };
        if descriptor.identity_key().is_empty() {
            return Err(DescriptorError::MissingTarget);
        }
        Ok(descriptor)
    }

    /// Full canonical URL, credentials included. Never log this.
    pub fn as_url(&self) -> &str {
        &self.canonical
    }

    /// The `authority + path` portion the identifier is derived from.
    ///
    /// Query string and fragment are excluded, so descriptors differing only in
    /// connection options share an identity.
    pub fn identity_key(&self) -> &str {
        let rest = &self.canonical[CANONICAL_SCHEME.len() + SCHEME_SEPARATOR.len()..];
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Deterministic identifier for this descriptor.
    pub fn identifier(&self) -> ConnectionId {
        ConnectionId::for_identity_key(self.identity_key())
    }

    /// Target database name, if the URL names one.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Display-safe version of the URL with the password masked.
    pub fn masked(&self) -> String {
        let rest_start = CANONICAL_SCHEME.len() + SCHEME_SEPARATOR.len();
        let rest = &self.canonical[rest_start..];
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        if let Some(at_pos) = rest[..authority_end].rfind('@') {
            if let Some(colon_pos) = rest[..at_pos].find(':') {
                return format!(
                    "{}{}****{}",
                    &self.canonical[..rest_start],
                    &rest[..colon_pos + 1],
                    &rest[at_pos..]
                );
            }
        }
        self.canonical.clone()
    }
}

fn database_from_path(path: &str) -> Option<String> {
    let name = path.trim_start_matches('/');
    (!name.is_empty()).then(|| name.to_string())
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionDescriptor")
            .field(&self.masked())
            .finish()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors that can occur when parsing a connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("Connection string cannot be empty")]
    Empty,

    /// Only postgres/postgresql URLs are accepted
    #[error("Unsupported scheme '{0}', expected postgresql://")]
    UnsupportedScheme(String),

    #[error("Malformed connection string: {0}")]
    Malformed(String),

    #[error("Connection string names neither a host nor a database")]
    MissingTarget,
}

impl From<DescriptorError> for crate::error::DbError {
    fn from(err: DescriptorError) -> Self {
        crate::error::DbError::invalid_descriptor(err.to_string())
    }
}

/// Opaque, deterministic connection identifier.
///
/// A UUID version 5 in the URL namespace over the descriptor's identity key,
/// so the same database always maps to the same ID, across restarts too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn for_identity_key(key: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A registered connection as reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionInfo {
    pub conn_id: String,
    /// Connection URL with the password masked
    pub descriptor: String,
    pub database: Option<String>,
    /// True while a live pool exists for this connection
    pub pool_active: bool,
}
