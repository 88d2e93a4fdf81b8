//! Session state holder.
//!
//! Owns the single active [`Session`] together with its live connection.
//! The session is only ever replaced wholesale, and the previous connection
//! is closed before the new one takes its place.

use crate::ports::database::DatabaseConnection;
use dbchat_domain::Session;
use tracing::info;

#[derive(Default)]
pub struct SessionState {
    session: Session,
    connection: Option<Box<dyn DatabaseConnection>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session
    pub fn snapshot(&self) -> &Session {
        &self.session
    }

    /// The live connection, if connected
    pub fn connection(&self) -> Option<&dyn DatabaseConnection> {
        self.connection.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some() && self.session.is_connected()
    }

    /// Install a freshly connected session, closing the previous connection
    pub async fn replace(&mut self, session: Session, connection: Box<dyn DatabaseConnection>) {
        if let Some(previous) = self.connection.take() {
            info!("Closing previous {} connection", previous.kind());
            previous.close().await;
        }
        self.session = session;
        self.connection = Some(connection);
    }

    /// Reset to an empty session, closing any connection
    pub async fn clear(&mut self) {
        if let Some(previous) = self.connection.take() {
            previous.close().await;
        }
        self.session = Session::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::database::DatabaseError;
    use async_trait::async_trait;
    use chrono::Utc;
    use dbchat_domain::{ConnectionUri, DbKind, QueryResult, SchemaCache};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockConnection {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DatabaseConnection for MockConnection {
        fn kind(&self) -> DbKind {
            DbKind::Sqlite
        }

        async fn introspect(&self) -> Result<SchemaCache, DatabaseError> {
            Ok(SchemaCache::new())
        }

        async fn execute(&self, _: &str, _: usize) -> Result<QueryResult, DatabaseError> {
            Ok(QueryResult::default())
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn session(uri: &str) -> Session {
        Session::connected(
            ConnectionUri::parse(uri).unwrap(),
            SchemaCache::new(),
            "snippet",
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_replace_closes_previous_connection() {
        let mut state = SessionState::new();
        assert!(!state.is_connected());

        let first_closed = Arc::new(AtomicBool::new(false));
        state
            .replace(
                session("sqlite:///a.db"),
                Box::new(MockConnection {
                    closed: first_closed.clone(),
                }),
            )
            .await;
        assert!(state.is_connected());

        let second_closed = Arc::new(AtomicBool::new(false));
        state
            .replace(
                session("sqlite:///b.db"),
                Box::new(MockConnection {
                    closed: second_closed.clone(),
                }),
            )
            .await;

        assert!(first_closed.load(Ordering::SeqCst));
        assert!(!second_closed.load(Ordering::SeqCst));
        assert_eq!(
            state.snapshot().connection_uri().unwrap().as_str(),
            "sqlite:///b.db"
        );
    }

    #[tokio::test]
    async fn test_clear_resets_session() {
        let mut state = SessionState::new();
        let closed = Arc::new(AtomicBool::new(false));
        state
            .replace(
                session("sqlite:///a.db"),
                Box::new(MockConnection {
                    closed: closed.clone(),
                }),
            )
            .await;

        state.clear().await;
        assert!(closed.load(Ordering::SeqCst));
        assert!(!state.is_connected());
        assert!(state.connection().is_none());
        assert_eq!(state.snapshot(), &Session::empty());
    }
}
