//! Hand-written port mocks shared by the dispatcher and controller tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::database::{DatabaseConnection, DatabaseConnector, DatabaseError};
use crate::ports::interpreter::{FailedAttempt, Interpreter, InterpreterError};
use async_trait::async_trait;
use dbchat_domain::{
    CellValue, ColumnDescriptor, ConnectionUri, DbKind, QueryResult, SchemaCache, SessionContext,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) fn users_schema() -> SchemaCache {
    SchemaCache::new().with_table(
        "users",
        vec![
            ColumnDescriptor::new("id", "INTEGER").primary_key(),
            ColumnDescriptor::new("name", "TEXT").not_null(),
            ColumnDescriptor::new("city", "TEXT"),
        ],
    )
}

pub(crate) fn count_result(n: i64) -> QueryResult {
    QueryResult::new(vec!["count".to_string()], vec![vec![CellValue::Integer(n)]])
}

#[derive(Default)]
struct ConnectorInner {
    schema: SchemaCache,
    results: HashMap<String, Result<QueryResult, String>>,
    next_connect_error: Option<String>,
    closed: usize,
    executed: Vec<String>,
}

/// Connector for sqlite, postgres and mysql URIs with scripted results.
/// Clones share state, so tests can keep a handle after moving one in.
#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    inner: Arc<Mutex<ConnectorInner>>,
}

impl MockConnector {
    pub fn new(schema: SchemaCache) -> Self {
        let connector = Self::default();
        connector.inner.lock().unwrap().schema = schema;
        connector
    }

    pub fn with_result(self, statement: &str, result: Result<QueryResult, &str>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .results
            .insert(statement.to_string(), result.map_err(str::to_string));
        self
    }

    pub fn fail_next_connect(&self, message: &str) {
        self.inner.lock().unwrap().next_connect_error = Some(message.to_string());
    }

    pub fn closed_count(&self) -> usize {
        self.inner.lock().unwrap().closed
    }

    pub fn executed(&self) -> Vec<String> {
        self.inner.lock().unwrap().executed.clone()
    }
}

#[async_trait]
impl DatabaseConnector for MockConnector {
    fn supports(&self, kind: DbKind) -> bool {
        matches!(kind, DbKind::Sqlite | DbKind::Postgres | DbKind::Mysql)
    }

    async fn connect(
        &self,
        uri: &ConnectionUri,
    ) -> Result<Box<dyn DatabaseConnection>, DatabaseError> {
        if let Some(message) = self.inner.lock().unwrap().next_connect_error.take() {
            return Err(DatabaseError::Connection(message));
        }
        Ok(Box::new(MockConnection {
            kind: uri.kind(),
            inner: self.inner.clone(),
        }))
    }
}

struct MockConnection {
    kind: DbKind,
    inner: Arc<Mutex<ConnectorInner>>,
}

#[async_trait]
impl DatabaseConnection for MockConnection {
    fn kind(&self) -> DbKind {
        self.kind
    }

    async fn introspect(&self) -> Result<SchemaCache, DatabaseError> {
        Ok(self.inner.lock().unwrap().schema.clone())
    }

    async fn execute(
        &self,
        statement: &str,
        _row_limit: usize,
    ) -> Result<QueryResult, DatabaseError> {
        let mut inner = self.inner.lock().unwrap();
        inner.executed.push(statement.to_string());
        match inner.results.get(statement) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(message)) => Err(DatabaseError::Execution(message.clone())),
            None => Err(DatabaseError::Execution(format!(
                "no result scripted for: {}",
                statement
            ))),
        }
    }

    async fn close(&self) {
        self.inner.lock().unwrap().closed += 1;
    }
}

/// Interpreter replaying scripted translations
#[derive(Default)]
pub(crate) struct MockInterpreter {
    translations: Mutex<VecDeque<String>>,
    feedback: Mutex<Vec<FailedAttempt>>,
    summary: Option<String>,
    label: Option<String>,
    resets: AtomicUsize,
}

impl MockInterpreter {
    pub fn new(translations: &[&str]) -> Self {
        Self {
            translations: Mutex::new(translations.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn feedback(&self) -> Vec<FailedAttempt> {
        self.feedback.lock().unwrap().clone()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Interpreter for MockInterpreter {
    async fn translate(
        &self,
        _request: &str,
        _context: &SessionContext,
        previous: Option<&FailedAttempt>,
    ) -> Result<String, InterpreterError> {
        if let Some(p) = previous {
            self.feedback.lock().unwrap().push(p.clone());
        }
        self.translations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(InterpreterError::NoStatement)
    }

    async fn summarize(
        &self,
        _question: &str,
        _statement: &str,
        _result: &QueryResult,
    ) -> Result<String, InterpreterError> {
        self.summary.clone().ok_or(InterpreterError::EmptyReply)
    }

    async fn converse(
        &self,
        message: &str,
        _context: &SessionContext,
    ) -> Result<String, InterpreterError> {
        Ok(format!("You said: {}", message))
    }

    async fn reset_conversation(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    async fn classify(
        &self,
        _text: &str,
        _context: &SessionContext,
    ) -> Result<String, InterpreterError> {
        self.label.clone().ok_or(InterpreterError::EmptyReply)
    }
}

/// Logger keeping every event in memory
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<(&'static str, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
