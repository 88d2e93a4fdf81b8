//! A live sqlx pool behind the [`DatabaseConnection`] port.

use super::{decode, introspect};
use async_trait::async_trait;
use dbchat_application::ports::database::{DatabaseConnection, DatabaseError};
use dbchat_domain::{DbKind, QueryResult, SchemaCache, StatementKind, classify_statement};
use futures::TryStreamExt;
use sqlx::{Column, Executor, MySqlPool, PgPool, Row, SqlitePool, Statement};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Clone)]
pub(crate) enum Pool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
    MySql(MySqlPool),
}

/// Reads at most `row_limit` rows and records whether more were available.
macro_rules! fetch_rows {
    ($pool:expr, $statement:expr, $row_limit:expr, $decode:path) => {{
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        let mut truncated = false;
        {
            let mut stream = sqlx::query($statement).fetch($pool);
            while let Some(row) = stream.try_next().await? {
                if rows.len() == $row_limit {
                    truncated = true;
                    break;
                }
                if columns.is_empty() {
                    columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                }
                rows.push((0..row.len()).map(|i| $decode(&row, i)).collect::<Vec<_>>());
            }
        }
        if columns.is_empty()
            && let Ok(prepared) = $pool.prepare($statement).await
        {
            columns = prepared
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
        }
        let mut result = QueryResult::new(columns, rows);
        result.truncated = truncated;
        Ok(result)
    }};
}

async fn fetch_sqlite(
    pool: &SqlitePool,
    statement: &str,
    row_limit: usize,
) -> Result<QueryResult, sqlx::Error> {
    fetch_rows!(pool, statement, row_limit, decode::sqlite_cell)
}

async fn fetch_postgres(
    pool: &PgPool,
    statement: &str,
    row_limit: usize,
) -> Result<QueryResult, sqlx::Error> {
    fetch_rows!(pool, statement, row_limit, decode::postgres_cell)
}

async fn fetch_mysql(
    pool: &MySqlPool,
    statement: &str,
    row_limit: usize,
) -> Result<QueryResult, sqlx::Error> {
    fetch_rows!(pool, statement, row_limit, decode::mysql_cell)
}

/// Pooled connection to one database
pub struct SqlxConnection {
    kind: DbKind,
    /// `None` once closed
    pool: Mutex<Option<Pool>>,
}

impl SqlxConnection {
    pub(crate) fn new(kind: DbKind, pool: Pool) -> Self {
        Self {
            kind,
            pool: Mutex::new(Some(pool)),
        }
    }

    async fn pool(&self) -> Result<Pool, DatabaseError> {
        self.pool.lock().await.clone().ok_or(DatabaseError::Closed)
    }
}

#[async_trait]
impl DatabaseConnection for SqlxConnection {
    fn kind(&self) -> DbKind {
        self.kind
    }

    async fn introspect(&self) -> Result<SchemaCache, DatabaseError> {
        let schema = match self.pool().await? {
            Pool::Sqlite(pool) => introspect::sqlite(&pool).await,
            Pool::Postgres(pool) => introspect::postgres(&pool).await,
            Pool::MySql(pool) => introspect::mysql(&pool).await,
        }
        .map_err(|e| DatabaseError::Introspection(error_message(&e)))?;

        debug!("Introspected {} tables", schema.len());
        Ok(schema)
    }

    async fn execute(
        &self,
        statement: &str,
        row_limit: usize,
    ) -> Result<QueryResult, DatabaseError> {
        let pool = self.pool().await?;
        let kind = classify_statement(statement);
        debug!(?kind, "Executing statement: {}", statement);

        let result = match (pool, kind) {
            (Pool::Sqlite(pool), StatementKind::Write) => sqlx::query(statement)
                .execute(&pool)
                .await
                .map(|r| QueryResult::affected(r.rows_affected())),
            (Pool::Postgres(pool), StatementKind::Write) => sqlx::query(statement)
                .execute(&pool)
                .await
                .map(|r| QueryResult::affected(r.rows_affected())),
            (Pool::MySql(pool), StatementKind::Write) => sqlx::query(statement)
                .execute(&pool)
                .await
                .map(|r| QueryResult::affected(r.rows_affected())),
            (Pool::Sqlite(pool), StatementKind::Read) => {
                fetch_sqlite(&pool, statement, row_limit).await
            }
            (Pool::Postgres(pool), StatementKind::Read) => {
                fetch_postgres(&pool, statement, row_limit).await
            }
            (Pool::MySql(pool), StatementKind::Read) => {
                fetch_mysql(&pool, statement, row_limit).await
            }
        };

        result.map_err(|e| DatabaseError::Execution(error_message(&e)))
    }

    async fn close(&self) {
        let Some(pool) = self.pool.lock().await.take() else {
            return;
        };
        match pool {
            Pool::Sqlite(pool) => pool.close().await,
            Pool::Postgres(pool) => pool.close().await,
            Pool::MySql(pool) => pool.close().await,
        }
        debug!("Closed {} connection", self.kind.label());
    }
}

/// The database's own message when there is one.
fn error_message(e: &sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::SqlxConnector;
    use super::*;
    use dbchat_application::ports::database::DatabaseConnector;
    use dbchat_domain::{CellValue, ConnectionUri};

    async fn memory() -> Box<dyn DatabaseConnection> {
        let uri = ConnectionUri::parse("sqlite://:memory:").unwrap();
        SqlxConnector::new().connect(&uri).await.unwrap()
    }

    async fn seeded() -> Box<dyn DatabaseConnection> {
        let db = memory().await;
        db.execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL, active BOOLEAN)",
            100,
        )
        .await
        .unwrap();
        let inserted = db
            .execute(
                "INSERT INTO users (name, score, active) VALUES ('ada', 9.5, 1), ('bob', NULL, 0), ('cy', 7.0, 1)",
                100,
            )
            .await
            .unwrap();
        assert_eq!(inserted.rows_affected, Some(3));
        db
    }

    #[tokio::test]
    async fn test_select_decodes_cells() {
        let db = seeded().await;
        let result = db
            .execute("SELECT id, name, score FROM users ORDER BY id", 100)
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["id", "name", "score"]);
        assert_eq!(result.row_count(), 3);
        assert_eq!(result.rows[0][0], CellValue::Integer(1));
        assert_eq!(result.rows[0][1], CellValue::Text("ada".into()));
        assert_eq!(result.rows[0][2], CellValue::Float(9.5));
        assert_eq!(result.rows[1][2], CellValue::Null);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_count_is_integer() {
        let db = seeded().await;
        let result = db.execute("SELECT COUNT(*) FROM users", 100).await.unwrap();
        assert_eq!(result.scalar(), Some(&CellValue::Integer(3)));
    }

    #[tokio::test]
    async fn test_row_limit_truncates() {
        let db = seeded().await;
        let result = db.execute("SELECT name FROM users", 2).await.unwrap();
        assert_eq!(result.row_count(), 2);
        assert!(result.truncated);
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let db = seeded().await;
        let result = db
            .execute("SELECT id, name FROM users WHERE id > 100", 100)
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns, vec!["id", "name"]);
    }

    #[tokio::test]
    async fn test_execution_error_uses_database_message() {
        let db = seeded().await;
        let err = db.execute("SELECT * FROM user", 100).await.unwrap_err();
        match err {
            DatabaseError::Execution(message) => assert!(message.contains("no such table: user")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_introspect_reads_columns() {
        let db = seeded().await;
        db.execute("CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER)", 100)
            .await
            .unwrap();

        let schema = db.introspect().await.unwrap();
        assert_eq!(schema.table_names(), vec!["orders", "users"]);

        let users = schema.columns("users").unwrap();
        assert_eq!(users.len(), 4);
        assert!(users[0].primary_key);
        assert_eq!(users[1].name, "name");
        assert_eq!(users[1].data_type, "TEXT");
        assert!(!users[1].nullable);
        assert!(users[2].nullable);
    }

    #[tokio::test]
    async fn test_closed_connection_fails() {
        let db = seeded().await;
        db.close().await;
        // closing twice is harmless
        db.close().await;

        assert!(matches!(
            db.execute("SELECT 1", 10).await,
            Err(DatabaseError::Closed)
        ));
        assert!(matches!(db.introspect().await, Err(DatabaseError::Closed)));
    }
}
