//! Local Ollama summarization through its OpenAI-compatible endpoint.
//!
//! Sends the user message only. `MAX_RESPONSE_TOKENS` and the sampling
//! settings are not forwarded; the server's model defaults apply.

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use super::openai::{complete, ChatMessage, ChatRequest};
use super::{build_prompt, trim_base, Summarizer};
use crate::config::{ProviderKind, SummarizerConfig};
use crate::error::ProviderError;
use crate::types::{PageContent, Summary};

// Ollama ignores the key but OpenAI-style clients must send one.
const PLACEHOLDER_KEY: &str = "ollama";

pub struct OllamaSummarizer {
    client: Client,
    host: String,
    endpoint: String,
    config: SummarizerConfig,
}

impl OllamaSummarizer {
    pub fn new(client: Client, host: &str, config: SummarizerConfig) -> Self {
        let host = trim_base(host);
        Self {
            client,
            endpoint: format!("{host}/v1/chat/completions"),
            host,
            config,
        }
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, content: &PageContent) -> Result<Summary, ProviderError> {
        info!("Using OLLAMA model: {} for AI ({})", self.config.model, self.host);

        let prompt = build_prompt(content);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: None,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stream: false,
        };

        let text = complete(&self.client, &self.endpoint, PLACEHOLDER_KEY, &request)
            .await
            .map_err(|e| match e {
                ProviderError::Transport(msg) => {
                    ProviderError::Transport(format!("Cannot reach Ollama at {}: {msg}", self.host))
                }
                other => other,
            })?;
        Ok(Summary { text })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::tests::summarizer_config;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn uses_placeholder_key_and_omits_token_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer ollama"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Local summary."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaSummarizer::new(
            Client::new(),
            &server.uri(),
            summarizer_config(ProviderKind::Ollama),
        );
        let summary = provider
            .summarize(&PageContent::new("page text"))
            .await
            .unwrap();
        assert_eq!(summary.text, "Local summary.");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "test-model");
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_host_names_the_host() {
        let provider = OllamaSummarizer::new(
            Client::new(),
            "http://127.0.0.1:9",
            summarizer_config(ProviderKind::Ollama),
        );
        let err = provider
            .summarize(&PageContent::new("x"))
            .await
            .unwrap_err();
        match err {
            ProviderError::Transport(msg) => assert!(msg.contains("http://127.0.0.1:9")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
