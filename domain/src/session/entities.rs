//! Session domain entities

use crate::database::kind::DbKind;
use crate::database::schema::SchemaCache;
use crate::database::uri::ConnectionUri;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single active database-connection context (Entity)
///
/// Created empty at process start and replaced wholesale on each successful
/// connect. `db_kind` always follows from `connection_uri`, and
/// `schema_cache` is only filled after a successful connection probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    connection_uri: Option<ConnectionUri>,
    db_kind: DbKind,
    schema_cache: SchemaCache,
    connection_snippet: Option<String>,
    connected_at: Option<DateTime<Utc>>,
}

impl Session {
    /// An empty session with no connection
    pub fn empty() -> Self {
        Self::default()
    }

    /// A session for a connection that has just been probed successfully
    pub fn connected(
        uri: ConnectionUri,
        schema_cache: SchemaCache,
        connection_snippet: impl Into<String>,
        connected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            db_kind: uri.kind(),
            connection_uri: Some(uri),
            schema_cache,
            connection_snippet: Some(connection_snippet.into()),
            connected_at: Some(connected_at),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_uri.is_some() && self.connected_at.is_some()
    }

    pub fn connection_uri(&self) -> Option<&ConnectionUri> {
        self.connection_uri.as_ref()
    }

    pub fn db_kind(&self) -> DbKind {
        self.db_kind
    }

    pub fn schema_cache(&self) -> &SchemaCache {
        &self.schema_cache
    }

    pub fn connection_snippet(&self) -> Option<&str> {
        self.connection_snippet.as_deref()
    }

    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }

    /// Replace the cached schema (e.g. after a refresh)
    pub fn with_schema(mut self, schema_cache: SchemaCache) -> Self {
        self.schema_cache = schema_cache;
        self
    }

    /// Session facts for prompts and `/session`, without secrets
    pub fn context(&self) -> SessionContext {
        SessionContext {
            connected: self.is_connected(),
            uri: self.connection_uri.as_ref().map(ConnectionUri::redacted),
            database: self.connection_uri.as_ref().map(ConnectionUri::database_name),
            db_kind: self.db_kind,
            tables: self
                .schema_cache
                .table_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            schema: self.schema_cache.describe(),
        }
    }
}

/// Redacted view of a session handed to the interpreter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub connected: bool,
    pub uri: Option<String>,
    pub database: Option<String>,
    pub db_kind: DbKind,
    pub tables: Vec<String>,
    pub schema: String,
}
