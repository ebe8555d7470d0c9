//! Error types for each pipeline stage.
//!
//! Fetch failures are soft by default (see `fetcher`); every other kind
//! ends the run.

use std::path::PathBuf;

use thiserror::Error;

/// Failure retrieving a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} for url: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Failure from a summarization backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Connection to summarization backend failed: {0}")]
    Transport(String),

    #[error("Summarization backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response from summarization backend: {0}")]
    MalformedResponse(String),

    #[error("Summarization backend returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failure from the text-to-speech backend.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Connection to speech backend failed: {0}")]
    Transport(String),

    #[error("Speech backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Nothing to synthesize: text is empty")]
    EmptyText,

    #[error("Failed to write audio to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Failure playing an audio file.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Cannot open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode audio file {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Playback of {path} did not finish within {secs}s")]
    Timeout { path: PathBuf, secs: u64 },

    #[error("Playback task failed: {0}")]
    Join(String),
}

/// Failure loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config file found (searched: {0})")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Any fatal error that ends a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
