//! OpenAI LLM session implementation
//!
//! The chat completions API is stateless, so the session keeps the
//! conversation history locally and sends it with each call. Only the
//! system prompt and the most recent turns are kept.

use super::gateway::Endpoint;
use super::protocol::{ChatRequest, ChatResponse, Message, Role, error_message};
use async_trait::async_trait;
use dbchat_application::ports::llm_gateway::{GatewayError, LlmSession};
use dbchat_domain::Model;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub struct OpenAiSession {
    endpoint: Arc<Endpoint>,
    model: Model,
    /// Conversation history, system prompt first
    messages: Mutex<Vec<Message>>,
}

impl OpenAiSession {
    pub(crate) fn new(endpoint: Arc<Endpoint>, model: Model, system_prompt: Option<String>) -> Self {
        let messages = system_prompt
            .filter(|p| !p.is_empty())
            .map(Message::system)
            .into_iter()
            .collect();
        Self {
            endpoint,
            model,
            messages: Mutex::new(messages),
        }
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: self.model.as_str(),
            messages,
            temperature: self.endpoint.temperature,
            max_tokens: self.endpoint.max_tokens,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            "Calling chat completions API"
        );

        let response = self
            .endpoint
            .client
            .post(&self.endpoint.completions_url)
            .bearer_auth(&self.endpoint.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status(status, &body, &self.model));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::RequestFailed(format!("Malformed completion response: {}", e))
        })?;
        parsed
            .into_content()
            .ok_or_else(|| GatewayError::RequestFailed("No choices in completion response".into()))
    }
}

#[async_trait]
impl LlmSession for OpenAiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let mut messages = self.messages.lock().await;
        messages.push(Message::user(content));

        match self.complete(&messages).await {
            Ok(reply) => {
                messages.push(Message::assistant(reply.clone()));
                trim_history(&mut messages, self.endpoint.history_turns);
                Ok(reply)
            }
            Err(e) => {
                // keep history consistent with what the model has seen
                messages.pop();
                Err(e)
            }
        }
    }
}

/// Drop the oldest exchanges so at most `turns` question/reply pairs remain
/// after the leading system messages.
fn trim_history(messages: &mut Vec<Message>, turns: usize) {
    let system = messages
        .iter()
        .take_while(|m| m.role == Role::System)
        .count();
    let keep = turns.saturating_mul(2);
    let excess = messages.len().saturating_sub(system + keep);
    if excess > 0 {
        debug!(dropped = excess, "Trimming conversation history");
        messages.drain(system..system + excess);
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

fn map_status(status: StatusCode, body: &str, model: &Model) -> GatewayError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::AuthenticationFailed(message)
        }
        StatusCode::NOT_FOUND => {
            GatewayError::ModelNotAvailable(format!("{}: {}", model, message))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}
