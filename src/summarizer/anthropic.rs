//! Hosted messages API backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{api_error, build_prompt, system_prompt, trim_base, Summarizer};
use crate::config::{ProviderKind, SummarizerConfig};
use crate::error::ProviderError;
use crate::types::{PageContent, Summary};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    config: SummarizerConfig,
}

impl AnthropicSummarizer {
    pub fn new(client: Client, base_url: &str, api_key: &str, config: SummarizerConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/messages", trim_base(base_url)),
            api_key: api_key.to_string(),
            config,
        }
    }
}

#[async_trait]
impl Summarizer for AnthropicSummarizer {
    async fn summarize(&self, content: &PageContent) -> Result<Summary, ProviderError> {
        info!("Using Claude model: {} for AI", self.config.model);
        let system = system_prompt(&self.config, ProviderKind::Anthropic);

        let prompt = build_prompt(content);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &system,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");
        let text = text.trim();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(Summary {
            text: text.to_string(),
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
