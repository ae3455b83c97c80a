// src/services/completion.rs

//! Client for an OpenAI-compatible `chat/completions` endpoint.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::CompletionConfig;
use crate::errors::{PetribotError, Result};

use super::BoxFuture;

/// Ask a question, get an answer.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatResponseChoice>,
}

impl ChatResponse {
    /// Content of the first choice.
    pub fn into_answer(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PetribotError::Upstream("invalid response format from API".to_string()))
    }
}

pub struct HttpCompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    /// Build a client, reading the API key from the environment variable
    /// named by `config.api_key_env`. A missing key is only reported when a
    /// completion is requested.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn complete_inner(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            return Err(PetribotError::MissingApiKey(self.config.api_key_env.clone()));
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending completion request");

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&self.request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(%status, body = %error_text, "completion API error");
            return Err(PetribotError::Upstream(format!(
                "API returned status {status}: {error_text}"
            )));
        }

        response.json::<ChatResponse>().await?.into_answer()
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.complete_inner(prompt))
    }
}
