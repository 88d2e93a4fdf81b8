//! Connection delegate: validate a URI, connect, introspect.

use super::DispatchError;
use crate::ports::database::{DatabaseConnection, DatabaseConnector, DatabaseError};
use chrono::Utc;
use dbchat_domain::{ConnectionUri, DbKind, DomainError, SchemaCache, Session};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct ConnectionDelegate {
    connector: Arc<dyn DatabaseConnector>,
    timeout: Duration,
}

impl ConnectionDelegate {
    pub fn new(connector: Arc<dyn DatabaseConnector>, timeout: Duration) -> Self {
        Self { connector, timeout }
    }

    /// Kinds a driver is available for
    pub fn supported_kinds(&self) -> Vec<DbKind> {
        DbKind::all()
            .into_iter()
            .filter(|k| self.connector.supports(*k))
            .collect()
    }

    /// Connect to `raw` and read its schema.
    ///
    /// Nothing is installed here; on success the caller receives the new
    /// session and its connection. Connecting and introspecting are bounded by the
    /// configured timeout.
    pub async fn connect(
        &self,
        raw: &str,
    ) -> Result<(Session, Box<dyn DatabaseConnection>), DispatchError> {
        let uri = ConnectionUri::parse(raw)?;
        let kind = uri.kind();
        if !self.connector.supports(kind) {
            let supported: Vec<&str> = self.supported_kinds().iter().map(|k| k.label()).collect();
            let what = if kind == DbKind::Unknown {
                format!("unrecognized URI scheme in '{}'", uri.redacted())
            } else {
                kind.label().to_string()
            };
            return Err(DomainError::UnsupportedDatabase(format!(
                "{} (supported: {})",
                what,
                supported.join(", ")
            ))
            .into());
        }

        info!("Connecting to {}", uri);
        let attempt = async {
            let connection = self.connector.connect(&uri).await?;
            match connection.introspect().await {
                Ok(schema) => Ok::<_, DatabaseError>((connection, schema)),
                Err(e) => {
                    connection.close().await;
                    Err(e)
                }
            }
        };
        let (connection, schema): (Box<dyn DatabaseConnection>, SchemaCache) =
            tokio::time::timeout(self.timeout, attempt)
                .await
                .map_err(|_| DispatchError::ConnectTimeout(self.timeout.as_secs()))??;
        debug!("Introspected {} tables", schema.len());

        let snippet = connection_snippet(&uri);
        Ok((
            Session::connected(uri, schema, snippet, Utc::now()),
            connection,
        ))
    }
}

/// Reusable Rust code that opens the same database with sqlx.
///
/// The URI is shown redacted and in the form sqlx parses.
pub fn connection_snippet(uri: &ConnectionUri) -> String {
    let options = match uri.kind() {
        DbKind::Postgres => "sqlx::postgres::PgPoolOptions",
        DbKind::Mysql => "sqlx::mysql::MySqlPoolOptions",
        _ => "sqlx::sqlite::SqlitePoolOptions",
    };
    let name = options.rsplit("::").next().unwrap_or(options);
    format!(
        r#"use {options};

let pool = {name}::new()
    .max_connections(5)
    .connect("{uri}")
    .await?;"#,
        options = options,
        name = name,
        uri = uri.redacted_driver_url(),
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use async_trait::async_trait;

    #[tokio::test]
    async fn test_connect_builds_session() {
        let delegate = ConnectionDelegate::new(
            Arc::new(MockConnector::new(users_schema())),
            Duration::from_secs(45),
        );
        let (session, connection) = delegate.connect("sqlite:///test.db").await.unwrap();

        assert!(session.is_connected());
        assert_eq!(session.db_kind(), DbKind::Sqlite);
        assert_eq!(connection.kind(), DbKind::Sqlite);
        assert!(
            session
                .connection_snippet()
                .unwrap()
                .contains("SqlitePoolOptions::new()")
        );
    }

    #[tokio::test]
    async fn test_rejects_bad_and_unsupported_uris() {
        let delegate = ConnectionDelegate::new(
            Arc::new(MockConnector::new(users_schema())),
            Duration::from_secs(45),
        );

        let err = delegate.connect("not a uri").await.err().unwrap();
        assert!(matches!(err, DispatchError::Domain(DomainError::InvalidUri(_))));

        let err = delegate.connect("redis://localhost:6379").await.err().unwrap();
        assert!(err.to_string().contains("redis"));
        assert!(err.to_string().contains("supported: mysql, postgres, sqlite"));

        let err = delegate.connect("ftp://files/x").await.err().unwrap();
        assert!(err.to_string().contains("unrecognized URI scheme"));
    }

    struct HangingConnector;

    #[async_trait]
    impl DatabaseConnector for HangingConnector {
        fn supports(&self, _kind: DbKind) -> bool {
            true
        }

        async fn connect(
            &self,
            _uri: &ConnectionUri,
        ) -> Result<Box<dyn DatabaseConnection>, DatabaseError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_connect_times_out() {
        let delegate =
            ConnectionDelegate::new(Arc::new(HangingConnector), Duration::from_millis(20));
        let err = delegate.connect("postgres://db/app").await.err().unwrap();
        assert!(matches!(err, DispatchError::ConnectTimeout(_)));
    }

    #[test]
    fn test_snippet_redacts_password() {
        let uri = ConnectionUri::parse("postgres://app:hunter2@db:5432/shop").unwrap();
        let snippet = connection_snippet(&uri);
        assert!(snippet.contains("use sqlx::postgres::PgPoolOptions;"));
        assert!(snippet.contains("postgres://app:***@db:5432/shop"));
        assert!(!snippet.contains("hunter2"));
    }

    fn snippet_url(snippet: &str) -> &str {
        let start = snippet.find(".connect(\"").unwrap() + ".connect(\"".len();
        let end = start + snippet[start..].find('"').unwrap();
        &snippet[start..end]
    }

    #[test]
    fn test_snippet_url_names_the_same_sqlite_file() {
        let uri = ConnectionUri::parse("sqlite:///test.db").unwrap();
        let snippet = connection_snippet(&uri);
        assert_eq!(snippet_url(&snippet), "sqlite://test.db?mode=rwc");

        // sqlx reads everything after `sqlite://` up to `?` as the filename
        let filename = snippet_url(&snippet)
            .strip_prefix("sqlite://")
            .and_then(|rest| rest.split('?').next())
            .unwrap();
        assert_eq!(
            uri.sqlite_target(),
            Some(dbchat_domain::SqliteTarget::File(filename.into()))
        );
    }

    #[test]
    fn test_snippet_normalizes_driver_scheme() {
        let uri = ConnectionUri::parse("postgresql+psycopg2://u:secret@db/app").unwrap();
        let snippet = connection_snippet(&uri);
        assert_eq!(snippet_url(&snippet), "postgres://u:***@db/app");
        assert!(!snippet.contains("secret"));
    }
}
