//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! One request per call, no retries. A failed call surfaces to the caller
//! and nothing else happens.

use crate::config::CompletionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion API key is not configured")]
    MissingApiKey,

    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Completion service returned no choices")]
    EmptyResponse,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Token accounting reported by the completion service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One generated text block plus whatever usage the service reported.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    pub fn new(config: &CompletionConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ideaforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Whether an API key is available. Without one every call fails fast.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one two-message completion request and returns the generated text.
    pub async fn chat(&self, system: &str, user: &str) -> Result<Completion, CompletionError> {
        self.send(
            vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            self.max_tokens,
        )
        .await
    }

    /// One-token probe used by the CLI and the admin console.
    pub async fn test_connection(&self) -> Result<(), CompletionError> {
        self.send(
            vec![ChatMessage {
                role: "user",
                content: "Hello",
            }],
            10,
        )
        .await
        .map(|_| ())
    }

    async fn send(
        &self,
        messages: Vec<ChatMessage<'_>>,
        max_tokens: u32,
    ) -> Result<Completion, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CompletionError::MissingApiKey);
        };

        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, body });
        }

        let response: ChatResponse = response.json().await?;
        let usage = response.usage;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(Completion { content, usage })
    }
}
