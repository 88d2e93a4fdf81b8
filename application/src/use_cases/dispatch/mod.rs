//! Agent dispatcher.
//!
//! Routes a [`DelegateRequest`] to one of three role-specialized delegates:
//!
//! | Request   | Delegate              | Outcome      |
//! |-----------|-----------------------|--------------|
//! | `Connect` | [`ConnectionDelegate`] | `Connected`  |
//! | `Query`   | [`QueryDelegate`]      | `Answered`   |
//! | `Analyze` | [`AnalysisDelegate`]   | `Analyzed`   |
//!
//! Delegates hold no session of their own; the dispatcher threads the
//! caller's [`SessionState`] through and installs a new session after a
//! successful connect.

pub mod analysis;
pub mod connection;
pub mod query;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{AnalysisAnswer, AnalysisDelegate};
pub use connection::{ConnectionDelegate, connection_snippet};
pub use query::{QueryAnswer, QueryDelegate};

use crate::config::AgentParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::database::{DatabaseConnection, DatabaseConnector, DatabaseError};
use crate::ports::interpreter::{FailedAttempt, Interpreter, InterpreterError};
use crate::use_cases::session_state::SessionState;
use dbchat_domain::{
    AnalyticsKind, DomainError, QueryResult, Session, SessionContext, ensure_read_only,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A request for one of the delegates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateRequest {
    Connect { uri: String },
    Query { question: String },
    Analyze { request: String, kind: AnalyticsKind },
}

impl DelegateRequest {
    pub fn delegate_name(&self) -> &'static str {
        match self {
            DelegateRequest::Connect { .. } => "connection",
            DelegateRequest::Query { .. } => "query",
            DelegateRequest::Analyze { .. } => "analysis",
        }
    }
}

/// What a delegate produced
#[derive(Debug, Clone)]
pub enum DelegateOutcome {
    /// The new session, already installed in the state
    Connected(Session),
    Answered(QueryAnswer),
    Analyzed(AnalysisAnswer),
}

/// Errors surfaced to the user by the delegates
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Database(#[from] DatabaseError),

    #[error("Interpreter error: {0}")]
    Interpreter(#[from] InterpreterError),

    #[error("Connection timed out after {0} seconds")]
    ConnectTimeout(u64),

    #[error("Query failed after {steps} attempt(s): {last_error}")]
    StepBudgetExhausted {
        steps: usize,
        last_statement: String,
        last_error: String,
    },
}

impl DispatchError {
    pub fn is_not_connected(&self) -> bool {
        matches!(self, DispatchError::Domain(e) if e.is_not_connected())
    }
}

pub struct AgentDispatcher {
    connection: ConnectionDelegate,
    query: QueryDelegate,
    analysis: AnalysisDelegate,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl AgentDispatcher {
    pub fn new(
        connector: Arc<dyn DatabaseConnector>,
        interpreter: Arc<dyn Interpreter>,
        params: AgentParams,
    ) -> Self {
        let logger: Arc<dyn ConversationLogger> = Arc::new(NoConversationLogger);
        Self {
            connection: ConnectionDelegate::new(connector, params.connect_timeout),
            query: QueryDelegate::new(interpreter.clone(), params.clone(), logger.clone()),
            analysis: AnalysisDelegate::new(interpreter, params, logger.clone()),
            conversation_logger: logger,
        }
    }

    /// Create with a transcript logger shared by all delegates.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.query.set_conversation_logger(logger.clone());
        self.analysis.set_conversation_logger(logger.clone());
        self.conversation_logger = logger;
        self
    }

    /// Run `request` against the current session.
    ///
    /// A successful connect replaces the session (closing the previous
    /// connection); every other outcome leaves the session untouched.
    pub async fn dispatch(
        &self,
        request: DelegateRequest,
        state: &mut SessionState,
    ) -> Result<DelegateOutcome, DispatchError> {
        let delegate = request.delegate_name();
        debug!("Dispatching to {} delegate", delegate);
        self.conversation_logger.log(ConversationEvent::new(
            "delegate_request",
            json!({ "delegate": delegate, "request": request_payload(&request) }),
        ));

        let outcome = match request {
            DelegateRequest::Connect { uri } => {
                match self.connection.connect(&uri).await {
                    Ok((session, connection)) => {
                        info!(
                            "Connected to {} ({} tables)",
                            session.db_kind(),
                            session.schema_cache().len()
                        );
                        state.replace(session.clone(), connection).await;
                        Ok(DelegateOutcome::Connected(session))
                    }
                    Err(e) => Err(e),
                }
            }
            DelegateRequest::Query { question } => self
                .query
                .answer(&question, state)
                .await
                .map(DelegateOutcome::Answered),
            DelegateRequest::Analyze { request, kind } => self
                .analysis
                .analyze(&request, kind, state)
                .await
                .map(DelegateOutcome::Analyzed),
        };

        match &outcome {
            Ok(_) => self.conversation_logger.log(ConversationEvent::new(
                "delegate_completed",
                json!({ "delegate": delegate }),
            )),
            Err(e) => {
                warn!("{} delegate failed: {}", delegate, e);
                self.conversation_logger.log(ConversationEvent::new(
                    "delegate_failed",
                    json!({ "delegate": delegate, "error": e.to_string() }),
                ));
            }
        }
        outcome
    }
}

fn request_payload(request: &DelegateRequest) -> serde_json::Value {
    match request {
        DelegateRequest::Connect { uri } => {
            // never log a password
            let shown = dbchat_domain::ConnectionUri::parse(uri.as_str())
                .map(|u| u.redacted())
                .unwrap_or_else(|_| uri.clone());
            json!({ "uri": shown })
        }
        DelegateRequest::Query { question } => json!({ "question": question }),
        DelegateRequest::Analyze { request, kind } => {
            json!({ "request": request, "kind": kind.as_str() })
        }
    }
}

/// The statement that finally ran and its rows
#[derive(Debug)]
pub(crate) struct StatementRun {
    pub statement: String,
    pub result: QueryResult,
    pub steps: usize,
}

/// Translate `request` and execute it, feeding execution errors back to the
/// interpreter until `max_steps` attempts are used up.
///
/// Sandbox violations end the run at once; they are not retried.
pub(crate) async fn run_statements(
    interpreter: &dyn Interpreter,
    connection: &dyn DatabaseConnection,
    context: &SessionContext,
    request: &str,
    params: &AgentParams,
    logger: &dyn ConversationLogger,
) -> Result<StatementRun, DispatchError> {
    let max_steps = params.max_steps.max(1);
    let mut previous: Option<FailedAttempt> = None;

    for step in 1..=max_steps {
        let statement = interpreter
            .translate(request, context, previous.as_ref())
            .await?;
        debug!("Step {}/{}: {}", step, max_steps, statement);
        logger.log(ConversationEvent::new(
            "statement",
            json!({ "step": step, "statement": statement }),
        ));

        if params.sandbox {
            ensure_read_only(&statement)?;
        }

        match connection.execute(&statement, params.row_limit).await {
            Ok(result) => {
                logger.log(ConversationEvent::new(
                    "statement_executed",
                    json!({ "step": step, "rows": result.row_count() }),
                ));
                return Ok(StatementRun {
                    statement,
                    result,
                    steps: step,
                });
            }
            Err(e) => {
                warn!("Step {}/{} failed: {}", step, max_steps, e);
                logger.log(ConversationEvent::new(
                    "execution_failed",
                    json!({ "step": step, "statement": statement, "error": e.to_string() }),
                ));
                previous = Some(FailedAttempt {
                    statement,
                    error: e.to_string(),
                });
            }
        }
    }

    let (last_statement, last_error) = previous
        .map(|p| (p.statement, p.error))
        .unwrap_or_default();
    Err(DispatchError::StepBudgetExhausted {
        steps: max_steps,
        last_statement,
        last_error,
    })
}
