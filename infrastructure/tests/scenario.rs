//! End-to-end chat scenarios against a real SQLite file.
//!
//! The interpreter is scripted; everything else (connector, controller,
//! exporter, transcript) is the production wiring.

use async_trait::async_trait;
use dbchat_application::{
    AgentDispatcher, AgentParams, ChatController, FailedAttempt, Interpreter, InterpreterError,
    Reply,
};
use dbchat_application::ports::database::DatabaseConnector;
use dbchat_domain::{AnalyticsKind, CellValue, ConnectionUri, DbKind, QueryResult, SessionContext};
use dbchat_infrastructure::{
    FileConversationExporter, JsonlConversationLogger, SqlxConnector, read_jsonl,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Answers by matching a phrase in the request; corrections come from a
/// second table keyed by the failed statement.
#[derive(Default)]
struct ScriptedInterpreter {
    translations: Vec<(&'static str, &'static str)>,
    corrections: Vec<(&'static str, &'static str)>,
    feedback: Mutex<Vec<FailedAttempt>>,
}

impl ScriptedInterpreter {
    fn new() -> Self {
        Self {
            translations: vec![
                ("how many rows in users", "SELECT COUNT(*) FROM users"),
                ("count the members", "SELECT COUNT(*) FROM user"),
                ("remove everyone", "DELETE FROM users"),
                ("users by city", "SELECT city, COUNT(*) AS n FROM users GROUP BY city"),
            ],
            corrections: vec![("SELECT COUNT(*) FROM user", "SELECT COUNT(*) FROM users")],
            feedback: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn translate(
        &self,
        request: &str,
        context: &SessionContext,
        previous: Option<&FailedAttempt>,
    ) -> Result<String, InterpreterError> {
        assert_eq!(context.db_kind, DbKind::Sqlite);
        if let Some(failed) = previous {
            self.feedback.lock().unwrap().push(failed.clone());
            return self
                .corrections
                .iter()
                .find(|(bad, _)| *bad == failed.statement)
                .map(|(_, fixed)| fixed.to_string())
                .ok_or(InterpreterError::NoStatement);
        }
        self.translations
            .iter()
            .find(|(phrase, _)| request.contains(phrase))
            .map(|(_, statement)| statement.to_string())
            .ok_or(InterpreterError::NoStatement)
    }

    async fn summarize(
        &self,
        _question: &str,
        _statement: &str,
        result: &QueryResult,
    ) -> Result<String, InterpreterError> {
        Ok(format!("{} row(s) returned.", result.row_count()))
    }

    async fn converse(
        &self,
        message: &str,
        _context: &SessionContext,
    ) -> Result<String, InterpreterError> {
        Ok(format!("You said: {}", message))
    }

    async fn classify(
        &self,
        _text: &str,
        _context: &SessionContext,
    ) -> Result<String, InterpreterError> {
        Ok("query".to_string())
    }
}

async fn seed_database(path: &Path) {
    let uri = ConnectionUri::parse(format!("sqlite:///{}", path.display())).unwrap();
    let db = SqlxConnector::new().connect(&uri).await.unwrap();
    db.execute(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, city TEXT, age INTEGER)",
        10,
    )
    .await
    .unwrap();
    db.execute(
        "INSERT INTO users (name, city, age) VALUES ('ada', 'Oslo', 36), ('bob', 'Lima', 41), ('cy', 'Oslo', 29)",
        10,
    )
    .await
    .unwrap();
    db.close().await;
}

struct Harness {
    controller: ChatController,
    interpreter: Arc<ScriptedInterpreter>,
    dir: tempfile::TempDir,
    db_path: PathBuf,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    seed_database(&db_path).await;

    let interpreter = Arc::new(ScriptedInterpreter::new());
    let transcript = JsonlConversationLogger::open(dir.path().join("transcript.jsonl")).unwrap();
    let dispatcher = AgentDispatcher::new(
        Arc::new(SqlxConnector::new()),
        interpreter.clone(),
        AgentParams::default(),
    )
    .with_conversation_logger(Arc::new(transcript));
    let controller = ChatController::new(
        dispatcher,
        interpreter.clone(),
        Arc::new(FileConversationExporter::new()),
    );

    Harness {
        controller,
        interpreter,
        dir,
        db_path,
    }
}

impl Harness {
    fn connect_line(&self) -> String {
        format!("/connect sqlite:///{}", self.db_path.display())
    }
}

#[tokio::test]
async fn connect_schema_query_exit() {
    let mut h = harness().await;

    match h.controller.handle_line(&h.connect_line()).await {
        Reply::Connected(session) => {
            assert_eq!(session.db_kind(), DbKind::Sqlite);
            assert!(session.connected_at().is_some());
            assert!(session.connection_snippet().is_some());
        }
        other => panic!("expected connection, got {:?}", other),
    }

    match h.controller.handle_line("/schema").await {
        Reply::Schema(schema) => {
            assert_eq!(schema.table_names(), vec!["users"]);
            assert_eq!(schema.columns("users").unwrap().len(), 4);
        }
        other => panic!("expected schema, got {:?}", other),
    }

    match h.controller.handle_line("/query how many rows in users").await {
        Reply::Answer(answer) => {
            assert_eq!(answer.statement, "SELECT COUNT(*) FROM users");
            assert_eq!(answer.result.scalar(), Some(&CellValue::Integer(3)));
            assert_eq!(answer.summary.as_deref(), Some("1 row(s) returned."));
            assert_eq!(answer.steps, 1);
        }
        other => panic!("expected answer, got {:?}", other),
    }

    assert!(matches!(h.controller.handle_line("/exit").await, Reply::Exit));
    h.controller.shutdown().await;

    let transcript = std::fs::read_to_string(h.dir.path().join("transcript.jsonl")).unwrap();
    assert!(transcript.contains("\"type\":\"delegate_request\""));
    assert!(transcript.contains("SELECT COUNT(*) FROM users"));
}

#[tokio::test]
async fn execution_error_is_corrected() {
    let mut h = harness().await;
    h.controller.handle_line(&h.connect_line()).await;

    match h.controller.handle_line("/query count the members").await {
        Reply::Answer(answer) => {
            assert_eq!(answer.steps, 2);
            assert_eq!(answer.result.scalar(), Some(&CellValue::Integer(3)));
        }
        other => panic!("expected answer, got {:?}", other),
    }

    let feedback = h.interpreter.feedback.lock().unwrap();
    assert_eq!(feedback.len(), 1);
    assert!(feedback[0].error.contains("no such table: user"));
}

#[tokio::test]
async fn sandbox_blocks_writes() {
    let mut h = harness().await;
    h.controller.handle_line(&h.connect_line()).await;

    match h.controller.handle_line("/query remove everyone").await {
        Reply::Error(message) => assert!(message.contains("read-only sandbox")),
        other => panic!("expected sandbox error, got {:?}", other),
    }

    match h.controller.handle_line("/query how many rows in users").await {
        Reply::Answer(answer) => assert_eq!(answer.result.scalar(), Some(&CellValue::Integer(3))),
        other => panic!("expected answer, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_connect_keeps_session() {
    let mut h = harness().await;
    h.controller.handle_line(&h.connect_line()).await;
    let before = h.controller.session().clone();

    match h.controller.handle_line("/connect mongodb://localhost/app").await {
        Reply::Error(message) => assert!(message.contains("Unsupported database")),
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(h.controller.session(), &before);

    // the old connection is still usable
    assert!(matches!(
        h.controller.handle_line("/query how many rows in users").await,
        Reply::Answer(_)
    ));
}

#[tokio::test]
async fn query_without_connection_continues() {
    let mut h = harness().await;

    match h.controller.handle_line("/query how many rows in users").await {
        Reply::Error(message) => assert!(message.contains("Not connected")),
        other => panic!("expected error, got {:?}", other),
    }
    match h.controller.handle_line("/analytics summary users by city").await {
        Reply::Error(message) => assert!(message.contains("Not connected")),
        other => panic!("expected error, got {:?}", other),
    }
    assert!(matches!(h.controller.handle_line("/help").await, Reply::Help));
}

#[tokio::test]
async fn analytics_report_from_real_rows() {
    let mut h = harness().await;
    h.controller.handle_line(&h.connect_line()).await;

    match h.controller.handle_line("/analytics table users by city").await {
        Reply::Analysis(answer) => {
            assert_eq!(answer.kind, AnalyticsKind::Table);
            let table = answer.report.table.unwrap();
            assert_eq!(table.columns, vec!["city", "n"]);
            assert_eq!(table.row_count(), 2);
        }
        other => panic!("expected analysis, got {:?}", other),
    }
}

#[tokio::test]
async fn export_reproduces_log_and_clear_empties_it() {
    let mut h = harness().await;
    h.controller.handle_line(&h.connect_line()).await;
    h.controller.handle_line("/query how many rows in users").await;
    h.controller.handle_line("hello there").await;

    let export_path = h.dir.path().join("exports/chat.jsonl");
    match h
        .controller
        .handle_line(&format!("/export {}", export_path.display()))
        .await
    {
        Reply::Exported { path, entries } => {
            assert_eq!(path, export_path);
            assert_eq!(entries, h.controller.log().len());
        }
        other => panic!("expected export, got {:?}", other),
    }

    let restored = read_jsonl(&export_path).unwrap();
    assert_eq!(&restored, h.controller.log());
    assert!(restored.len() >= 6);

    assert!(matches!(h.controller.handle_line("/clear").await, Reply::Cleared));
    match h.controller.handle_line("/history").await {
        Reply::History(entries) => assert!(entries.is_empty()),
        other => panic!("expected history, got {:?}", other),
    }
}
