//! Opens sqlx pools for a connection URI.

use super::connection::{Pool, SqlxConnection};
use async_trait::async_trait;
use dbchat_application::ports::database::{DatabaseConnection, DatabaseConnector, DatabaseError};
use dbchat_domain::{ConnectionUri, DbKind, SqliteTarget};
use sqlx::Executor;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Connector for the SQL databases sqlx ships drivers for
#[derive(Debug, Clone)]
pub struct SqlxConnector {
    max_connections: u32,
    read_only: bool,
}

impl Default for SqlxConnector {
    fn default() -> Self {
        Self {
            max_connections: 4,
            read_only: false,
        }
    }
}

impl SqlxConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Ask the driver to refuse writes on every pooled connection.
    ///
    /// SQLite files are opened read-only and are not created when missing.
    /// Postgres sessions start with `default_transaction_read_only`, MySQL
    /// sessions with `SET SESSION TRANSACTION READ ONLY`.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    async fn open_sqlite(&self, uri: &ConnectionUri) -> Result<Pool, DatabaseError> {
        let target = uri
            .sqlite_target()
            .ok_or_else(|| DatabaseError::InvalidUri(uri.redacted()))?;

        let pool = match target {
            SqliteTarget::Memory => {
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;
                // every connection would see its own empty database
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
            SqliteTarget::File(path) => {
                debug!(read_only = self.read_only, "Opening SQLite file {}", path.display());
                let options = SqliteConnectOptions::new()
                    .filename(&path)
                    .read_only(self.read_only)
                    .create_if_missing(!self.read_only);
                SqlitePoolOptions::new()
                    .max_connections(self.max_connections)
                    .connect_with(options)
                    .await
            }
        };
        pool.map(Pool::Sqlite)
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }

    async fn open_postgres(&self, uri: &ConnectionUri) -> Result<Pool, DatabaseError> {
        let mut options = PgConnectOptions::from_str(&uri.driver_url())
            .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;
        if self.read_only {
            options = options.options([("default_transaction_read_only", "on")]);
        }
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .map(Pool::Postgres)
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }

    async fn open_mysql(&self, uri: &ConnectionUri) -> Result<Pool, DatabaseError> {
        let options = MySqlConnectOptions::from_str(&uri.driver_url())
            .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;
        let mut pool = MySqlPoolOptions::new().max_connections(self.max_connections);
        if self.read_only {
            pool = pool.after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                    Ok(())
                })
            });
        }
        pool.connect_with(options)
            .await
            .map(Pool::MySql)
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }
}

#[async_trait]
impl DatabaseConnector for SqlxConnector {
    fn supports(&self, kind: DbKind) -> bool {
        matches!(kind, DbKind::Sqlite | DbKind::Postgres | DbKind::Mysql)
    }

    async fn connect(
        &self,
        uri: &ConnectionUri,
    ) -> Result<Box<dyn DatabaseConnection>, DatabaseError> {
        let kind = uri.kind();
        let pool = match kind {
            DbKind::Sqlite => self.open_sqlite(uri).await?,
            DbKind::Postgres => self.open_postgres(uri).await?,
            DbKind::Mysql => self.open_mysql(uri).await?,
            DbKind::Mongo | DbKind::Redis | DbKind::Unknown => {
                return Err(DatabaseError::Unsupported(kind.label().to_string()));
            }
        };

        info!(kind = kind.label(), "Opened {}", uri.redacted());
        Ok(Box::new(SqlxConnection::new(kind, pool)))
    }
}
