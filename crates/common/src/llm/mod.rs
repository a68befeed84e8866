//! LLM completion client and the summarization stage built on it
//!
//! `CompletionModel` is the raw chat-completion call and may fail.
//! `Summarizer` wraps it and never does: every failure, including a
//! missing credential, comes back as `Outcome::Failure`.

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use crate::metrics::{ExternalCall, Service};
use crate::models::Summary;
use crate::outcome::Outcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for chat-completion providers
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Send one user message and return the assistant's reply
    async fn complete(&self, prompt: &str, model: &str) -> Result<String>;
}

/// Groq chat-completions client (OpenAI-compatible)
pub struct GroqClient {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

impl GroqClient {
    /// Create a new client. The API key is checked per call.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionModel for GroqClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential { name: "GROQ_API_KEY" })?;

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self.client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Completion {
                message: format!("LLM API request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Completion {
                message: format!("LLM API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::MalformedResponse {
                service: "completion",
                message: format!("Failed to parse LLM response: {}", e),
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::MalformedResponse {
                service: "completion",
                message: "Empty response from LLM".to_string(),
            })
    }
}

/// Summarization stage
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn CompletionModel>,
    default_model: String,
}

impl Summarizer {
    pub fn new(model: Arc<dyn CompletionModel>, default_model: impl Into<String>) -> Self {
        Self {
            model,
            default_model: default_model.into(),
        }
    }

    /// Combine an instruction and the material it applies to
    pub fn build_prompt(text: &str, instruction: &str) -> String {
        format!("{}:\n\n{}", instruction, text)
    }

    /// Summarize with the default model
    pub async fn summarize(&self, text: &str, instruction: &str) -> Outcome<Summary> {
        let model = self.default_model.clone();
        self.summarize_with(text, instruction, &model).await
    }

    /// Summarize with an explicit model. Never fails the caller.
    pub async fn summarize_with(&self, text: &str, instruction: &str, model: &str) -> Outcome<Summary> {
        let prompt = Self::build_prompt(text, instruction);

        let call = ExternalCall::start(Service::Completion);
        let result = self.model.complete(&prompt, model).await;
        let latency_ms = call.finish(result.is_ok());

        match result {
            Ok(analysis) => {
                tracing::info!(model, latency_ms, prompt_chars = prompt.len(), "Summary generated");
                Outcome::Success(Summary {
                    analysis,
                    model_used: model.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(model, latency_ms, error = %e, "Summarization failed");
                e.into()
            }
        }
    }
}
