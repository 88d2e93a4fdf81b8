//! Interpreter port
//!
//! The natural-language backend: turns questions into statements, explains
//! results, chats, and labels free text.

use super::llm_gateway::GatewayError;
use async_trait::async_trait;
use dbchat_domain::{QueryResult, SessionContext};
use thiserror::Error;

/// Errors from the interpreter
#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("No response from model")]
    EmptyReply,

    #[error("Model reply contained no statement")]
    NoStatement,
}

/// A statement that failed, fed back for correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub statement: String,
    pub error: String,
}

/// Natural-language backend used by the delegates and the router
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Translate a request into one statement for the connected database
    async fn translate(
        &self,
        request: &str,
        context: &SessionContext,
        previous: Option<&FailedAttempt>,
    ) -> Result<String, InterpreterError>;

    /// Explain a result in a few sentences
    async fn summarize(
        &self,
        question: &str,
        statement: &str,
        result: &QueryResult,
    ) -> Result<String, InterpreterError>;

    /// Answer casual conversation
    async fn converse(
        &self,
        message: &str,
        context: &SessionContext,
    ) -> Result<String, InterpreterError>;

    /// Forget the casual conversation so far
    async fn reset_conversation(&self) {}

    /// Label free text; the reply is parsed with `Intent::from_label`
    async fn classify(
        &self,
        text: &str,
        context: &SessionContext,
    ) -> Result<String, InterpreterError>;
}
