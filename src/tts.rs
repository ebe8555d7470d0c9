//! Text-to-speech through an OpenAI-style `/v1/audio/speech` endpoint.
//!
//! Pipeline:
//! 1. Text → chunks of at most 4096 chars, cut on sentence boundaries
//! 2. Chunk → one speech request each, MP3 back
//! 3. MP3 bytes concatenated → `<path>.part` → renamed to `<path>`

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{EndpointConfig, SpeechConfig};
use crate::error::SynthesisError;

pub const DEFAULT_VOICE: &str = "nova";

/// Per-request input limit of the speech endpoint.
const MAX_INPUT_CHARS: usize = 4096;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` with `voice` and write the audio to `output_path`.
    /// The file exists only once every byte of it has been written.
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        output_path: &Path,
    ) -> Result<(), SynthesisError>;
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

pub struct OpenAiSpeech {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiSpeech {
    pub fn new(endpoints: &EndpointConfig, speech: &SpeechConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoints.request_timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/audio/speech",
                endpoints.openai_base_url.trim_end_matches('/')
            ),
            api_key: endpoints.openai_key.clone(),
            model: speech.model.clone(),
        })
    }

    async fn request_chunk(&self, input: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let request = SpeechRequest {
            model: &self.model,
            input,
            voice,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(SynthesisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        output_path: &Path,
    ) -> Result<(), SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }
        let voice = if voice.trim().is_empty() {
            DEFAULT_VOICE
        } else {
            voice
        };

        let t0 = Instant::now();
        let chunks = chunk_text(text, MAX_INPUT_CHARS);
        info!(
            "Generating Audio with {voice} Voice ({} chars, {} request(s))",
            text.chars().count(),
            chunks.len()
        );

        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let bytes = self.request_chunk(chunk, voice).await?;
            debug!("Chunk {}/{}: {} bytes", i + 1, chunks.len(), bytes.len());
            audio.extend_from_slice(&bytes);
        }

        write_complete(output_path, &audio).await?;
        info!(
            "Wrote {} bytes to {} in {}ms",
            audio.len(),
            output_path.display(),
            t0.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Write to a sibling `.part` file, then rename into place.
async fn write_complete(path: &Path, bytes: &[u8]) -> Result<(), SynthesisError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    let part = part_path(path);
    if let Err(e) = tokio::fs::write(&part, bytes).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(io_error(&part)(e));
    }
    if let Err(e) = tokio::fs::rename(&part, path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(io_error(path)(e));
    }
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SynthesisError {
    let path = path.to_path_buf();
    move |source| SynthesisError::Io { path, source }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Pack sentences into chunks of at most `max_chars` characters.
/// A sentence longer than the limit is cut at whitespace where possible.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for sentence in split_sentences(text.trim()) {
        for piece in split_long(sentence, max_chars) {
            let piece_chars = piece.chars().count();
            if current_chars > 0 && current_chars + 1 + piece_chars > max_chars {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if current_chars > 0 {
                current.push(' ');
                current_chars += 1;
            }
            current.push_str(piece);
            current_chars += piece_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_long(mut text: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    while let Some((cut, _)) = text.char_indices().nth(max_chars) {
        let split = text[..cut]
            .rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(cut);
        pieces.push(text[..split].trim_end());
        text = text[split..].trim_start();
    }
    if !text.is_empty() {
        pieces.push(text);
    }
    pieces
}

/// Split text into sentences at .!? boundaries.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if (b == b'.' || b == b'!' || b == b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_whitespace()
        {
            let end = i + 1;
            let s = text[start..end].trim();
            if !s.is_empty() {
                sentences.push(s);
            }
            start = end;
        }
    }

    // Remainder
    let s = text[start..].trim();
    if !s.is_empty() {
        sentences.push(s);
    }

    sentences
}
