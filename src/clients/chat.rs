use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat API key is not configured")]
    NotConfigured,
    #[error("Chat API returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("Chat API response contained no choices")]
    EmptyResponse,
    #[error("Request to chat API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completion client used by the scout setup
/// conversation.
pub struct ChatClient {
    client: Client,
    completion_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    #[must_use]
    pub fn new(client: Client, config: &ChatConfig) -> Self {
        Self {
            client,
            completion_url: config.completion_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::NotConfigured)?;

        let response = self
            .client
            .post(&self.completion_url)
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, message });
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ChatError::EmptyResponse)
    }
}
