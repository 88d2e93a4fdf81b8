//! LLM-backed interpreter.
//!
//! [`LlmInterpreter`] implements the [`Interpreter`] port on top of an
//! [`LlmGateway`]. Translation, summaries and classification use a fresh
//! session per call; conversation keeps one session so the model remembers
//! earlier turns, and starts over when the connection changes or on reset.

use crate::ports::interpreter::{FailedAttempt, Interpreter, InterpreterError};
use crate::ports::llm_gateway::{LlmGateway, LlmSession};
use async_trait::async_trait;
use dbchat_domain::core::string::truncate;
use dbchat_domain::{Model, PromptTemplate, QueryResult, SessionContext, extract_statement};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Rows of a result shown to the model when summarizing
const SUMMARY_PREVIEW_ROWS: usize = 20;

/// A conversation session and the (redacted) URI it was started for
struct ConversationSession {
    uri: Option<String>,
    session: Box<dyn LlmSession>,
}

pub struct LlmInterpreter {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
    conversation: Mutex<Option<ConversationSession>>,
}

impl LlmInterpreter {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model) -> Self {
        Self {
            gateway,
            model,
            conversation: Mutex::new(None),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    async fn ask_once(&self, system: &str, prompt: &str) -> Result<String, InterpreterError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(&self.model, system)
            .await?;
        let reply = session.send(prompt).await?;
        if reply.trim().is_empty() {
            return Err(InterpreterError::EmptyReply);
        }
        Ok(reply)
    }
}

#[async_trait]
impl Interpreter for LlmInterpreter {
    async fn translate(
        &self,
        request: &str,
        context: &SessionContext,
        previous: Option<&FailedAttempt>,
    ) -> Result<String, InterpreterError> {
        let system = PromptTemplate::translate_system(context);
        let prompt = PromptTemplate::translate_prompt(
            request,
            previous.map(|p| (p.statement.as_str(), p.error.as_str())),
        );
        let reply = self.ask_once(&system, &prompt).await?;
        debug!("Translation reply: {}", truncate(&reply, 200));
        extract_statement(&reply).ok_or(InterpreterError::NoStatement)
    }

    async fn summarize(
        &self,
        question: &str,
        statement: &str,
        result: &QueryResult,
    ) -> Result<String, InterpreterError> {
        let prompt = PromptTemplate::summarize_prompt(
            question,
            statement,
            &result.preview(SUMMARY_PREVIEW_ROWS),
        );
        let reply = self
            .ask_once(PromptTemplate::summarize_system(), &prompt)
            .await?;
        Ok(reply.trim().to_string())
    }

    async fn converse(
        &self,
        message: &str,
        context: &SessionContext,
    ) -> Result<String, InterpreterError> {
        let mut guard = self.conversation.lock().await;
        let stale = guard
            .as_ref()
            .is_none_or(|c| c.uri != context.uri);
        if stale {
            debug!("Starting conversation session for {:?}", context.uri);
            let session = self
                .gateway
                .create_session_with_system_prompt(
                    &self.model,
                    &PromptTemplate::converse_system(context),
                )
                .await?;
            *guard = Some(ConversationSession {
                uri: context.uri.clone(),
                session,
            });
        }

        let Some(conversation) = guard.as_ref() else {
            return Err(InterpreterError::EmptyReply);
        };
        let reply = conversation.session.send(message).await?;
        if reply.trim().is_empty() {
            return Err(InterpreterError::EmptyReply);
        }
        Ok(reply.trim().to_string())
    }

    async fn reset_conversation(&self) {
        if self.conversation.lock().await.take().is_some() {
            debug!("Conversation session discarded");
        }
    }

    async fn classify(
        &self,
        text: &str,
        context: &SessionContext,
    ) -> Result<String, InterpreterError> {
        let prompt = PromptTemplate::classify_prompt(text, context);
        let reply = self
            .ask_once(PromptTemplate::classify_system(), &prompt)
            .await?;
        Ok(reply.trim().to_string())
    }
}
