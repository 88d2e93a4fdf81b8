//! Analysis delegate: fetch data for an analytics request and build a report.

use super::{DispatchError, run_statements};
use crate::config::AgentParams;
use crate::ports::conversation_logger::ConversationLogger;
use crate::ports::interpreter::Interpreter;
use crate::use_cases::session_state::SessionState;
use dbchat_domain::core::string::truncate;
use dbchat_domain::{AnalysisReport, AnalyticsKind, DomainError, PromptTemplate, Question};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisAnswer {
    pub request: String,
    pub kind: AnalyticsKind,
    pub statement: String,
    pub report: AnalysisReport,
    pub steps: usize,
}

pub struct AnalysisDelegate {
    interpreter: Arc<dyn Interpreter>,
    params: AgentParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl AnalysisDelegate {
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

    pub async fn analyze(
        &self,
        request: &str,
        kind: AnalyticsKind,
        state: &SessionState,
    ) -> Result<AnalysisAnswer, DispatchError> {
        let connection = state.connection().ok_or(DomainError::NotConnected)?;
        let request = Question::try_new(request)?;
        let context = state.snapshot().context();
        let prompt = PromptTemplate::analysis_prompt(request.content(), kind);

        let run = run_statements(
            self.interpreter.as_ref(),
            connection,
            &context,
            &prompt,
            &self.params,
            self.conversation_logger.as_ref(),
        )
        .await?;

        let title = format!("Analytics {}: {}", kind_title(kind), truncate(request.content(), 60));
        let report = AnalysisReport::build(title, kind, &run.result);
        Ok(AnalysisAnswer {
            request: request.into_content(),
            kind,
            statement: run.statement,
            report,
            steps: run.steps,
        })
    }
}

fn kind_title(kind: AnalyticsKind) -> &'static str {
    match kind {
        AnalyticsKind::Dashboard => "Dashboard",
        AnalyticsKind::Summary => "Summary",
        AnalyticsKind::Table => "Table",
        AnalyticsKind::Correlation => "Correlation",
    }
}
