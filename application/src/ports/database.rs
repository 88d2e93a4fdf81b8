//! Database ports
//!
//! [`DatabaseConnector`] opens connections for a URI; [`DatabaseConnection`]
//! is one live handle that can introspect its schema and execute statements.
//! Driver adapters live in the infrastructure layer.

use async_trait::async_trait;
use dbchat_domain::{ConnectionUri, DbKind, QueryResult, SchemaCache};
use thiserror::Error;

/// Errors raised by database adapters
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Unsupported database: {0}")]
    Unsupported(String),

    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Schema introspection failed: {0}")]
    Introspection(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Connection is closed")]
    Closed,
}

/// Opens connections for the database kinds it supports
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Whether a driver for `kind` is available
    fn supports(&self, kind: DbKind) -> bool;

    /// Open and probe a connection
    async fn connect(&self, uri: &ConnectionUri)
    -> Result<Box<dyn DatabaseConnection>, DatabaseError>;
}

/// A live database connection
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    fn kind(&self) -> DbKind;

    /// Read the tables and their columns
    async fn introspect(&self) -> Result<SchemaCache, DatabaseError>;

    /// Execute one statement, reading at most `row_limit` rows
    async fn execute(&self, statement: &str, row_limit: usize)
    -> Result<QueryResult, DatabaseError>;

    /// Release the connection. Further calls fail with [`DatabaseError::Closed`].
    async fn close(&self);
}
