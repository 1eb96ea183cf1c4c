use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// A chat prompt for the external generative text service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f64,
}

/// The external "complete this prompt" capability.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the raw text of the first completion choice.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` when the call fails or yields no content.
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, CompletionError>;
}

#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

impl CompletionConfig {
    /// Reads `OPENAI_API_KEY`, `QUIZ_AI_BASE_URL`, `QUIZ_AI_MODEL` and `QUIZ_AI_TIMEOUT_SECS`.
    ///
    /// Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| "gpt-4o".into());
        let timeout = env::var("QUIZ_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Some(Self {
            base_url,
            api_key,
            model,
            timeout,
        })
    }
}

/// OpenAI-compatible `chat/completions` client.
///
/// Without a config every call fails with `CompletionError::Disabled`.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    config: Option<CompletionConfig>,
}

impl OpenAiCompletionClient {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: Option<CompletionConfig>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.as_ref().and_then(|c| c.timeout) {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, CompletionError> {
        let config = self.config.as_ref().ok_or(CompletionError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.clone(),
                },
            ],
            temperature: prompt.temperature,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CompletionError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
