//! Page summarization behind one trait, three backends.
//!
//! - `openai`: hosted chat completions (`/v1/chat/completions`, bearer key)
//! - `anthropic`: hosted messages API (`/v1/messages`, `x-api-key`)
//! - `ollama`: local OpenAI-compatible server (placeholder key, no token limit)
//!
//! The backend is picked once from `SELECTED_MODEL_TYPE` by [`from_config`].

pub mod anthropic;
pub mod ollama;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::{Config, ProviderKind, SummarizerConfig};
use crate::error::ProviderError;
use crate::types::{PageContent, Summary};

const PROMPT_PREAMBLE: &str =
    "Please synthesize and provide a detailed overview of the following content.";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant named {persona}. Provide concise answers to simple questions and thorough responses to complex, open-ended queries.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Send one request for `content` and wait for the complete answer.
    async fn summarize(&self, content: &PageContent) -> Result<Summary, ProviderError>;

    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;
}

/// Build the backend selected by the configuration.
pub fn from_config(config: &Config) -> Result<Box<dyn Summarizer>, ProviderError> {
    let client = http_client(Duration::from_secs(config.endpoints.request_timeout_secs))?;
    let summarizer = config.summarizer.clone();
    let endpoints = &config.endpoints;
    debug!(
        "Using system prompt: {}",
        system_prompt(&summarizer, summarizer.provider)
    );

    Ok(match summarizer.provider {
        ProviderKind::OpenAi => Box::new(openai::OpenAiSummarizer::new(
            client,
            &endpoints.openai_base_url,
            &endpoints.openai_key,
            summarizer,
        )),
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicSummarizer::new(
            client,
            &endpoints.anthropic_base_url,
            &endpoints.claude_key,
            summarizer,
        )),
        ProviderKind::Ollama => Box::new(ollama::OllamaSummarizer::new(
            client,
            &endpoints.ollama_host,
            summarizer,
        )),
    })
}

fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport(format!("Failed to create HTTP client: {e}")))
}

/// The user message: fixed instruction plus the page text, untruncated.
pub fn build_prompt(content: &PageContent) -> String {
    format!("{PROMPT_PREAMBLE}\nContent:\n{}", content.raw_text)
}

/// Configured system prompt, or the default persona for `kind`.
pub fn system_prompt(config: &SummarizerConfig, kind: ProviderKind) -> String {
    match &config.system_prompt {
        Some(prompt) => prompt.clone(),
        None => DEFAULT_SYSTEM_PROMPT.replace("{persona}", kind.persona()),
    }
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Turn a non-success response body into a `ProviderError::Api`, using the
/// backend's own message when it sent one.
fn api_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });
    ProviderError::Api {
        status: status.as_u16(),
        message,
    }
}
