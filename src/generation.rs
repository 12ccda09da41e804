//! Chat-completion client for an Azure OpenAI deployment.

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::types::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anything that turns a conversation into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the Azure OpenAI chat completions API
pub struct AzureOpenAiClient {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        if config.endpoint.is_empty() || config.deployment.is_empty() {
            return Err(GenerationError::MissingEndpoint);
        }
        if config.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| GenerationError::Transport {
                url: config.endpoint.clone(),
                source,
            })?;

        Ok(Self { config, client })
    }

    /// Full chat-completions URL for the configured deployment
    pub fn url(&self) -> String {
        completions_url(&self.config)
    }
}

fn completions_url(config: &GenerationConfig) -> String {
    let endpoint = config.endpoint.trim_end_matches('/');
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint, config.deployment, config.api_version
    )
}

/// Pull the first choice's text out of a response body
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| GenerationError::MalformedResponse("no message in first choice".to_string()))
}

#[async_trait]
impl TextGenerator for AzureOpenAiClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let url = self.url();
        let body = CompletionRequest {
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!(%url, messages = messages.len(), "Calling completion API");

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| GenerationError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|source| GenerationError::Transport { url, source })?;

        if !status.is_success() {
            tracing::warn!(%status, "Completion API returned an error");
            return Err(GenerationError::Status { status, body: text });
        }

        tracing::debug!("API response received");
        parse_completion(&text)
    }
}
