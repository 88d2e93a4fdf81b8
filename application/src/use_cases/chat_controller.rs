//! Chat controller: the command router.
//!
//! [`ChatController::handle_line`] turns one input line into a [`Reply`]:
//! it parses the line, records conversational turns in the
//! [`ConversationLog`], hands delegate work to the [`AgentDispatcher`], and
//! answers view commands (`/history`, `/session`, ...) directly.
//!
//! Conversational commands (connect, query, analytics, schema, unknown
//! verbs, free text) record the raw input before dispatch and the reply
//! after. View commands are not recorded.

use crate::config::{ClassifierMode, expand_home};
use crate::ports::conversation_exporter::{ConversationExporter, ExportFormat};
use crate::ports::interpreter::Interpreter;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::dispatch::{
    AgentDispatcher, AnalysisAnswer, DelegateOutcome, DelegateRequest, QueryAnswer,
};
use crate::use_cases::route_intent::IntentRouter;
use crate::use_cases::session_state::SessionState;
use chrono::Local;
use dbchat_domain::{
    AnalyticsKind, Command, ConversationEntry, ConversationLog, DomainError, Intent, Role,
    SchemaCache, Session,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Entries shown by `/history` without a count
pub const DEFAULT_HISTORY_DISPLAY: usize = 10;

/// Rows of a query result copied into the conversation log
const LOGGED_PREVIEW_ROWS: usize = 10;

/// What the presentation layer should show for one input line
#[derive(Debug, Clone)]
pub enum Reply {
    /// Blank input
    Nothing,
    Connected(Session),
    Answer(QueryAnswer),
    Analysis(AnalysisAnswer),
    /// Assistant text (conversation, analytics help)
    Message(String),
    Schema(SchemaCache),
    /// `None` without an active session
    SessionInfo(Option<Session>),
    History(Vec<ConversationEntry>),
    Help,
    Exported { path: PathBuf, entries: usize },
    Cleared,
    /// A neutral notice, e.g. nothing to export
    Notice(String),
    Error(String),
    Exit,
}

impl Reply {
    /// Entry recorded in the conversation log for this reply
    fn log_entry(&self) -> Option<ConversationEntry> {
        let (role, content) = match self {
            Reply::Connected(session) => (Role::Assistant, describe_connection(session)),
            Reply::Answer(answer) => (Role::Assistant, describe_answer(answer)),
            Reply::Analysis(answer) => (Role::Assistant, describe_analysis(answer)),
            Reply::Message(text) => (Role::Assistant, text.clone()),
            Reply::Schema(schema) => (Role::Assistant, schema.describe()),
            Reply::Error(message) => (Role::Error, message.clone()),
            _ => return None,
        };
        Some(ConversationEntry::new(role, content))
    }
}

fn describe_connection(session: &Session) -> String {
    let uri = session
        .connection_uri()
        .map(|u| u.redacted())
        .unwrap_or_default();
    let mut text = format!(
        "Connected to {} database: {} ({} tables)",
        session.db_kind(),
        uri,
        session.schema_cache().len()
    );
    if let Some(snippet) = session.connection_snippet() {
        text.push_str("\n\n");
        text.push_str(snippet);
    }
    text
}

fn describe_answer(answer: &QueryAnswer) -> String {
    let mut text = String::new();
    if let Some(summary) = &answer.summary {
        text.push_str(summary);
        text.push_str("\n\n");
    }
    text.push_str(&format!("Statement: {}\n\n", answer.statement));
    text.push_str(&answer.result.preview(LOGGED_PREVIEW_ROWS));
    text
}

fn describe_analysis(answer: &AnalysisAnswer) -> String {
    let rows = answer
        .report
        .summary
        .as_ref()
        .map(|s| s.total_records)
        .or_else(|| answer.report.table.as_ref().map(|t| t.row_count()));
    let mut text = format!("{}\nStatement: {}", answer.report.title, answer.statement);
    if let Some(rows) = rows {
        text.push_str(&format!("\nRecords analyzed: {}", rows));
    }
    for note in &answer.report.notes {
        text.push('\n');
        text.push_str(note);
    }
    text
}

/// Text shown by `/analytics` without a request
pub fn analytics_help(session: &Session) -> String {
    let tables = if session.is_connected() {
        let names = session.schema_cache().table_names();
        if names.is_empty() {
            "(no tables)".to_string()
        } else {
            names.join(", ")
        }
    } else {
        "No database connected".to_string()
    };
    let kinds: Vec<&str> = AnalyticsKind::all().iter().map(|k| k.as_str()).collect();
    format!(
        r#"Analytics commands:
  /analytics <request>          Dashboard for a request
  /analytics <kind> <request>   Kinds: {}
  /dashboard <request>          Dashboard for a request

Examples:
  /analytics sales by region
  /analytics correlation price and quantity of orders
  /dashboard signups per month

Available tables: {}"#,
        kinds.join(", "),
        tables
    )
}

/// Where `/export` writes when no path is given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub directory: PathBuf,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: ExportFormat::Text,
        }
    }
}

pub struct ChatController {
    dispatcher: AgentDispatcher,
    interpreter: Arc<dyn Interpreter>,
    router: IntentRouter,
    exporter: Arc<dyn ConversationExporter>,
    progress: Arc<dyn ProgressNotifier>,
    export: ExportSettings,
    history_display: usize,
    state: SessionState,
    log: ConversationLog,
}

impl ChatController {
    pub fn new(
        dispatcher: AgentDispatcher,
        interpreter: Arc<dyn Interpreter>,
        exporter: Arc<dyn ConversationExporter>,
    ) -> Self {
        Self {
            dispatcher,
            router: IntentRouter::new(ClassifierMode::default(), interpreter.clone()),
            interpreter,
            exporter,
            progress: Arc::new(NoProgress),
            export: ExportSettings::default(),
            history_display: DEFAULT_HISTORY_DISPLAY,
            state: SessionState::new(),
            log: ConversationLog::new(),
        }
    }

    pub fn with_classifier(mut self, mode: ClassifierMode) -> Self {
        self.router = IntentRouter::new(mode, self.interpreter.clone());
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_export_settings(mut self, export: ExportSettings) -> Self {
        self.export = export;
        self
    }

    pub fn with_history_display(mut self, n: usize) -> Self {
        self.history_display = n.max(1);
        self
    }

    pub fn session(&self) -> &Session {
        self.state.snapshot()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Handle one input line
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        let command = Command::parse(line);
        let record = command.is_conversational();
        if record {
            self.log.append(ConversationEntry::user(line.trim()));
        }

        let reply = self.execute(command).await;

        if record && let Some(entry) = reply.log_entry() {
            self.log.append(entry);
        }
        reply
    }

    /// Close the active connection before exit
    pub async fn shutdown(&mut self) {
        self.state.clear().await;
    }

    async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Empty => Reply::Nothing,
            Command::Connect(uri) => self.delegate(DelegateRequest::Connect { uri }).await,
            Command::Query(question) => self.delegate(DelegateRequest::Query { question }).await,
            Command::Analyze { request, kind } => {
                self.delegate(DelegateRequest::Analyze { request, kind })
                    .await
            }
            Command::AnalyticsHelp => Reply::Message(analytics_help(self.state.snapshot())),
            Command::Schema => {
                if self.state.is_connected() {
                    Reply::Schema(self.state.snapshot().schema_cache().clone())
                } else {
                    Reply::Error(DomainError::NotConnected.to_string())
                }
            }
            Command::Session => {
                let session = self.state.snapshot();
                Reply::SessionInfo(session.is_connected().then(|| session.clone()))
            }
            Command::History(n) => Reply::History(
                self.log
                    .recent(n.unwrap_or(self.history_display))
                    .to_vec(),
            ),
            Command::Clear => {
                self.log.clear();
                self.interpreter.reset_conversation().await;
                Reply::Cleared
            }
            Command::Export(path) => self.export(path),
            Command::Help => Reply::Help,
            Command::Exit => Reply::Exit,
            Command::Usage { usage, .. } => Reply::Error(format!("Usage: {}", usage)),
            Command::Unknown(line) => Reply::Error(format!(
                "Unknown command: {}. Type /help for available commands.",
                line
            )),
            Command::FreeText(text) => self.free_text(text).await,
        }
    }

    async fn free_text(&mut self, text: String) -> Reply {
        let context = self.state.snapshot().context();
        let intent = self.router.classify(&text, &context).await;
        debug!("Free text routed as {}", intent.label());
        match intent {
            Intent::Connect(uri) => {
                self.delegate(DelegateRequest::Connect {
                    uri: uri.as_str().to_string(),
                })
                .await
            }
            Intent::Query => self.delegate(DelegateRequest::Query { question: text }).await,
            Intent::Analyze => {
                self.delegate(DelegateRequest::Analyze {
                    request: text,
                    kind: AnalyticsKind::Dashboard,
                })
                .await
            }
            Intent::Conversation => {
                self.progress.on_task_start("Thinking...");
                let result = self.interpreter.converse(&text, &context).await;
                self.progress.on_task_end(result.is_ok());
                match result {
                    Ok(reply) => Reply::Message(reply),
                    Err(e) => Reply::Error(e.to_string()),
                }
            }
        }
    }

    async fn delegate(&mut self, request: DelegateRequest) -> Reply {
        let label = match request {
            DelegateRequest::Connect { .. } => "Connecting to database...",
            DelegateRequest::Query { .. } => "Thinking...",
            DelegateRequest::Analyze { .. } => "Analyzing data...",
        };
        self.progress.on_task_start(label);
        let result = self.dispatcher.dispatch(request, &mut self.state).await;
        self.progress.on_task_end(result.is_ok());

        match result {
            Ok(DelegateOutcome::Connected(session)) => Reply::Connected(session),
            Ok(DelegateOutcome::Answered(answer)) => Reply::Answer(answer),
            Ok(DelegateOutcome::Analyzed(answer)) => Reply::Analysis(answer),
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    fn export(&self, path: Option<String>) -> Reply {
        if self.log.is_empty() {
            return Reply::Notice("No conversation history to export.".to_string());
        }
        let (path, format) = match path {
            Some(p) => {
                let path = expand_home(&p);
                let format = ExportFormat::from_path(&path).unwrap_or(self.export.format);
                (path, format)
            }
            None => (
                self.export
                    .directory
                    .join(self.export.format.default_file_name(Local::now())),
                self.export.format,
            ),
        };

        match self.exporter.export(&self.log, &path, format) {
            Ok(()) => {
                info!("Exported {} entries to {}", self.log.len(), path.display());
                Reply::Exported {
                    path,
                    entries: self.log.len(),
                }
            }
            Err(e) => Reply::Error(e.to_string()),
        }
    }
}
