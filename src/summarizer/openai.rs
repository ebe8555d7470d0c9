//! Hosted chat completions backend.
//!
//! Also defines the OpenAI-compatible wire types that `ollama` reuses.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{api_error, build_prompt, trim_base, Summarizer};
use crate::config::{ProviderKind, SummarizerConfig};
use crate::error::ProviderError;
use crate::types::{PageContent, Summary};

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// POST a chat completions request and return the first choice's text.
pub(crate) async fn complete(
    client: &Client,
    url: &str,
    api_key: &str,
    request: &ChatRequest<'_>,
) -> Result<String, ProviderError> {
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }

    let parsed: ChatResponse = serde_json::from_str(&body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

pub struct OpenAiSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    config: SummarizerConfig,
}

impl OpenAiSummarizer {
    pub fn new(client: Client, base_url: &str, api_key: &str, config: SummarizerConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/chat/completions", trim_base(base_url)),
            api_key: api_key.to_string(),
            config,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, content: &PageContent) -> Result<Summary, ProviderError> {
        info!("Using OpenAI model: {} for AI", self.config.model);

        let prompt = build_prompt(content);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            top_p: Some(self.config.top_p),
            frequency_penalty: Some(self.config.frequency_penalty),
            presence_penalty: Some(self.config.presence_penalty),
            stream: false,
        };

        let text = complete(&self.client, &self.endpoint, &self.api_key, &request).await?;
        Ok(Summary { text })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
