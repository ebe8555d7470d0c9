//! Page retrieval and visible-text extraction.
//!
//! A failed fetch is soft by default: the error description comes back as the
//! page text so the rest of the pipeline still runs. `FetchPolicy::Strict`
//! turns the same failure into an error.

use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Node};
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;
use crate::types::PageContent;

// Some sites reject reqwest's default agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Return the failure text as page content.
    FailSoft,
    /// Propagate the failure.
    Strict,
}

pub struct ContentFetcher {
    client: Client,
    policy: FetchPolicy,
}

impl ContentFetcher {
    pub fn new(policy: FetchPolicy, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client, policy })
    }

    /// Fetch `url` and keep only its visible text.
    pub async fn fetch(&self, url: &Url) -> Result<PageContent, FetchError> {
        match self.fetch_page(url).await {
            Ok(page) => Ok(page),
            Err(e) if self.policy == FetchPolicy::FailSoft => {
                warn!("Fetch failed, continuing with the error text as content: {e}");
                Ok(PageContent::new(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_page(&self, url: &Url) -> Result<PageContent, FetchError> {
        debug!("Fetching {url}");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!("Fetched {} bytes of markup", html.len());

        Ok(PageContent::new(extract_visible_text(&html)))
    }
}

/// Text a reader would see: tag contents joined by single spaces, with
/// scripts, styles and other hidden elements dropped.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let words: Vec<&str> = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            (!hidden).then_some(&**text)
        })
        .flat_map(str::split_whitespace)
        .collect();
    words.join(" ")
}
