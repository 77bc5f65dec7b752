//! Language-model completion client abstraction
//!
//! Provides a unified interface over chat-completion providers:
//! - OpenAI-compatible HTTP endpoints
//! - Mock client for development and testing

use crate::config::LlmConfig;
use crate::errors::{AgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System-role instruction
    pub system_prompt: String,

    /// User-role prompt body
    pub user_prompt: String,

    /// Model name to use
    pub model: String,

    /// Maximum completion tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Trait for text-completion services
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a completion; fails with `ModelUnavailable` when the model
    /// name is unsupported, the request is malformed, or the service is
    /// unreachable.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiClient {
    /// Create a new client from config
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Configuration {
                message: "llm.api_key is required for the OpenAI client".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ModelUnavailable {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelUnavailable {
                message: format!("API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| AgentError::ModelUnavailable {
                    message: format!("Failed to parse response: {}", e),
                })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| AgentError::ModelUnavailable {
                message: "Empty response from model".to_string(),
            })
    }
}

/// Mock completion client for development and testing
///
/// Returns the scripted response for every request, or fails every
/// request when constructed with `unavailable()`.
pub struct MockCompletionClient {
    response: Option<String>,
}

impl MockCompletionClient {
    /// Client that always answers with `response`
    pub fn scripted(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    /// Client that fails every call, driving fallback paths
    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(AgentError::ModelUnavailable {
                message: format!("mock client has no completion for model '{}'", request.model),
            }),
        }
    }
}

/// Create a completion client based on configuration; falls back to the
/// mock client when no API key is configured.
pub fn create_completion_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>> {
    match config.api_key {
        Some(_) => Ok(Arc::new(OpenAiClient::new(config)?)),
        None => {
            tracing::warn!("No LLM API key configured, using mock completion client");
            Ok(Arc::new(MockCompletionClient::unavailable()))
        }
    }
}
