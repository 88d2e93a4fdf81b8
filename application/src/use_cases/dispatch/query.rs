//! Query delegate: answer a natural-language question from the database.

use super::{DispatchError, run_statements};
use crate::config::AgentParams;
use crate::ports::conversation_logger::ConversationLogger;
use crate::ports::interpreter::Interpreter;
use crate::use_cases::session_state::SessionState;
use dbchat_domain::{DomainError, QueryResult, Question};
use std::sync::Arc;
use tracing::warn;

/// A question answered from the connected database
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    pub question: String,
    /// The statement that produced `result`
    pub statement: String,
    pub result: QueryResult,
    pub summary: Option<String>,
    /// Attempts used, at most `max_steps`
    pub steps: usize,
}

pub struct QueryDelegate {
    interpreter: Arc<dyn Interpreter>,
    params: AgentParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl QueryDelegate {
    pub fn new(
        interpreter: Arc<dyn Interpreter>,
        params: AgentParams,
        conversation_logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        Self {
            interpreter,
            params,
            conversation_logger,
        }
    }

    pub fn set_conversation_logger(&mut self, logger: Arc<dyn ConversationLogger>) {
        self.conversation_logger = logger;
    }

    pub async fn answer(
        &self,
        question: &str,
        state: &SessionState,
    ) -> Result<QueryAnswer, DispatchError> {
        let connection = state.connection().ok_or(DomainError::NotConnected)?;
        let question = Question::try_new(question)?;
        let context = state.snapshot().context();

        let run = run_statements(
            self.interpreter.as_ref(),
            connection,
            &context,
            question.content(),
            &self.params,
            self.conversation_logger.as_ref(),
        )
        .await?;

        let summary = if self.params.summarize_results && run.result.rows_affected.is_none() {
            match self
                .interpreter
                .summarize(question.content(), &run.statement, &run.result)
                .await
            {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Result summary failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(QueryAnswer {
            question: question.into_content(),
            statement: run.statement,
            result: run.result,
            summary,
            steps: run.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::ports::database::DatabaseConnector;
    use chrono::Utc;
    use dbchat_domain::{ConnectionUri, Session};

    async fn connected_state(connector: &MockConnector) -> SessionState {
        let uri = ConnectionUri::parse("sqlite:///test.db").unwrap();
        let connection = connector.connect(&uri).await.unwrap();
        let mut state = SessionState::new();
        state
            .replace(
                Session::connected(uri, users_schema(), "snippet", Utc::now()),
                connection,
            )
            .await;
        state
    }

    fn delegate(interpreter: MockInterpreter, params: AgentParams) -> QueryDelegate {
        QueryDelegate::new(Arc::new(interpreter), params, Arc::new(NoConversationLogger))
    }

    #[tokio::test]
    async fn test_answer_with_summary() {
        let connector = MockConnector::new(users_schema())
            .with_result("SELECT COUNT(*) FROM users", Ok(count_result(3)));
        let state = connected_state(&connector).await;
        let d = delegate(
            MockInterpreter::new(&["SELECT COUNT(*) FROM users"]).with_summary("There are 3 users."),
            AgentParams::default(),
        );

        let answer = d.answer("how many rows in users", &state).await.unwrap();
        assert_eq!(answer.statement, "SELECT COUNT(*) FROM users");
        assert_eq!(answer.result.scalar(), Some(&dbchat_domain::CellValue::Integer(3)));
        assert_eq!(answer.summary.as_deref(), Some("There are 3 users."));
        assert_eq!(answer.steps, 1);
    }

    #[tokio::test]
    async fn test_execution_error_is_fed_back() {
        let connector = MockConnector::new(users_schema())
            .with_result("SELECT COUNT(*) FROM user", Err("no such table: user"))
            .with_result("SELECT COUNT(*) FROM users", Ok(count_result(3)));
        let state = connected_state(&connector).await;
        let interpreter = Arc::new(MockInterpreter::new(&[
            "SELECT COUNT(*) FROM user",
            "SELECT COUNT(*) FROM users",
        ]));
        let d = QueryDelegate::new(
            interpreter.clone(),
            AgentParams::default().with_summarize_results(false),
            Arc::new(NoConversationLogger),
        );

        let answer = d.answer("how many users", &state).await.unwrap();
        assert_eq!(answer.steps, 2);
        assert!(answer.summary.is_none());
        let feedback = interpreter.feedback();
        assert_eq!(feedback.len(), 1);
        assert!(feedback[0].error.contains("no such table: user"));
    }

    #[tokio::test]
    async fn test_step_budget_exhausted() {
        let connector = MockConnector::new(users_schema())
            .with_result("SELECT a", Err("bad a"))
            .with_result("SELECT b", Err("bad b"));
        let state = connected_state(&connector).await;
        let d = delegate(
            MockInterpreter::new(&["SELECT a", "SELECT b", "SELECT c"]),
            AgentParams::default().with_max_steps(2),
        );

        let err = d.answer("anything", &state).await.unwrap_err();
        match err {
            DispatchError::StepBudgetExhausted {
                steps,
                last_statement,
                last_error,
            } => {
                assert_eq!(steps, 2);
                assert_eq!(last_statement, "SELECT b");
                assert!(last_error.contains("bad b"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(connector.executed(), vec!["SELECT a", "SELECT b"]);
    }

    #[tokio::test]
    async fn test_sandbox_rejects_writes() {
        let connector = MockConnector::new(users_schema());
        let state = connected_state(&connector).await;
        let d = delegate(MockInterpreter::new(&["DELETE FROM users"]), AgentParams::default());

        let err = d.answer("remove everyone", &state).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Domain(DomainError::SandboxViolation(_))
        ));
        assert!(connector.executed().is_empty());
    }

    #[tokio::test]
    async fn test_sandbox_can_be_disabled() {
        let connector = MockConnector::new(users_schema())
            .with_result("DELETE FROM users", Ok(QueryResult::affected(3)));
        let state = connected_state(&connector).await;
        let d = delegate(
            MockInterpreter::new(&["DELETE FROM users"]).with_summary("unused"),
            AgentParams::default().with_sandbox(false),
        );

        let answer = d.answer("remove everyone", &state).await.unwrap();
        assert_eq!(answer.result.rows_affected, Some(3));
        assert!(answer.summary.is_none());
    }

    #[tokio::test]
    async fn test_not_connected() {
        let d = delegate(MockInterpreter::new(&["SELECT 1"]), AgentParams::default());
        let err = d.answer("how many users", &SessionState::new()).await.unwrap_err();
        assert!(err.is_not_connected());
    }
}
