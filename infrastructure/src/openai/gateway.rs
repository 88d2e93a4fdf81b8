//! OpenAI LLM Gateway implementation

use super::session::OpenAiSession;
use async_trait::async_trait;
use dbchat_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use dbchat_domain::Model;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Connection settings shared by every session
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    /// Question/reply pairs a session keeps besides its system prompt
    pub history_turns: usize,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: None,
            max_tokens: Some(1024),
            timeout: Duration::from_secs(60),
            history_turns: 20,
        }
    }
}

/// Shared HTTP state handed to sessions
pub(crate) struct Endpoint {
    pub client: reqwest::Client,
    pub api_key: String,
    pub completions_url: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub history_turns: usize,
}

/// LLM Gateway implementation for OpenAI-compatible APIs
pub struct OpenAiLlmGateway {
    endpoint: Arc<Endpoint>,
}

impl std::fmt::Debug for OpenAiLlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiLlmGateway")
            .field("completions_url", &self.endpoint.completions_url)
            .field("api_key", &"***")
            .finish()
    }
}

impl OpenAiLlmGateway {
    pub fn new(api_key: impl Into<String>, settings: OpenAiSettings) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::AuthenticationFailed(
                "API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let completions_url = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
        info!("Using chat completions endpoint {}", completions_url);

        Ok(Self {
            endpoint: Arc::new(Endpoint {
                client,
                api_key,
                completions_url,
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
                history_turns: settings.history_turns.max(1),
            }),
        })
    }

    pub fn completions_url(&self) -> &str {
        &self.endpoint.completions_url
    }
}

#[async_trait]
impl LlmGateway for OpenAiLlmGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            self.endpoint.clone(),
            model.clone(),
            None,
        )))
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            self.endpoint.clone(),
            model.clone(),
            Some(system_prompt.to_string()),
        )))
    }
}
