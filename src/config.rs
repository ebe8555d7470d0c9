//! Configuration management for readit-rs.
//!
//! Loads the flat `config.json` key format (`OPENAI_KEY`, `SELECTED_MODEL`, ...)
//! from JSON or YAML. The core keys are required; a missing or malformed key
//! is a startup error rather than a silent default.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::error::ConfigError;

/// Which summarization backend a run talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProviderKind {
    /// Hosted chat completions API.
    #[serde(rename = "openai")]
    OpenAi,
    /// Hosted messages API.
    #[serde(rename = "claude", alias = "anthropic")]
    Anthropic,
    /// Self-hosted OpenAI-compatible inference server.
    #[serde(rename = "ollama")]
    Ollama,
}

impl ProviderKind {
    /// Assistant name used in the default system prompt.
    pub fn persona(self) -> &'static str {
        match self {
            Self::OpenAi => "ChatGPT",
            Self::Anthropic => "Claude",
            Self::Ollama => "Ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Anthropic => write!(f, "Claude"),
            Self::Ollama => write!(f, "OLLAMA"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    #[serde(rename = "SELECTED_MODEL_TYPE")]
    pub provider: ProviderKind,
    #[serde(rename = "SELECTED_MODEL")]
    pub model: String,
    #[serde(rename = "MAX_RESPONSE_TOKENS", deserialize_with = "number_or_string")]
    pub max_tokens: u32,
    #[serde(rename = "TEMPERATURE", default = "default_one")]
    pub temperature: f32,
    #[serde(rename = "TOP_P", default = "default_one")]
    pub top_p: f32,
    #[serde(rename = "FREQUENCY_PENALTY", default)]
    pub frequency_penalty: f32,
    #[serde(rename = "PRESENCE_PENALTY", default)]
    pub presence_penalty: f32,
    #[serde(rename = "SYSTEM_PROMPT", default)]
    pub system_prompt: Option<String>,
}

/// Credentials and base URLs for the remote services.
#[derive(Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(rename = "OPENAI_KEY")]
    pub openai_key: String,
    #[serde(rename = "CLAUDE_KEY")]
    pub claude_key: String,
    #[serde(rename = "OLLAMA_HOST")]
    pub ollama_host: String,
    #[serde(rename = "OPENAI_BASE_URL", default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(rename = "ANTHROPIC_BASE_URL", default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,
    #[serde(rename = "REQUEST_TIMEOUT_SECS", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Keys stay out of logs.
impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("openai_key", &redact(&self.openai_key))
            .field("claude_key", &redact(&self.claude_key))
            .field("ollama_host", &self.ollama_host)
            .field("openai_base_url", &self.openai_base_url)
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    #[serde(rename = "AUDIO_VOICE")]
    pub voice: String,
    #[serde(rename = "TTS_MODEL", default = "default_tts_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub summarizer: SummarizerConfig,
    #[serde(flatten)]
    pub endpoints: EndpointConfig,
    #[serde(flatten)]
    pub speech: SpeechConfig,
    #[serde(rename = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
    /// Directory holding the cue sounds.
    #[serde(rename = "CUE_DIR", default = "default_cue_dir")]
    pub cue_dir: PathBuf,
    /// Treat fetch failures as fatal instead of summarizing the error text.
    #[serde(rename = "STRICT_FETCH", default)]
    pub strict_fetch: bool,
    #[serde(rename = "PLAYBACK_TIMEOUT_SECS", default = "default_playback_timeout")]
    pub playback_timeout_secs: u64,
}

fn default_one() -> f32 {
    1.0
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".into()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".into()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_tts_model() -> String {
    "tts-1-hd".into()
}

fn default_cue_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_playback_timeout() -> u64 {
    1800
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// `MAX_RESPONSE_TOKENS` is written as a string in older config files.
fn number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

impl Config {
    /// Load configuration from a JSON or YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.json
    /// 2. ./config.yaml
    /// 3. ~/.config/readit/config.json
    /// 4. ~/.config/readit/config.yaml
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let candidates = Self::candidates();
                candidates.iter().find(|p| p.exists()).cloned().ok_or_else(|| {
                    let searched: Vec<String> =
                        candidates.iter().map(|p| p.display().to_string()).collect();
                    ConfigError::NotFound(searched.join(", "))
                })?
            }
        };

        let contents = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

        let config = Self::parse(&contents, Format::from_path(&config_path)).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: config_path.clone(),
                message,
            },
            other => other,
        })?;

        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    fn candidates() -> Vec<PathBuf> {
        let cwd = std::env::current_dir().ok();
        let user = dirs::home_dir().map(|h| h.join(".config/readit"));
        [
            cwd.as_ref().map(|d| d.join("config.json")),
            cwd.as_ref().map(|d| d.join("config.yaml")),
            user.as_ref().map(|d| d.join("config.json")),
            user.as_ref().map(|d| d.join("config.yaml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn parse(contents: &str, format: Format) -> Result<Self, ConfigError> {
        let parsed: Result<Self, String> = match format {
            Format::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            Format::Yaml => serde_yml::from_str(contents).map_err(|e| e.to_string()),
        };
        let config = parsed.map_err(|message| ConfigError::Parse {
            path: PathBuf::new(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.summarizer.model.trim().is_empty() {
            return Err(ConfigError::Invalid("SELECTED_MODEL is empty".into()));
        }
        if self.summarizer.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "MAX_RESPONSE_TOKENS must be greater than zero".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.summarizer.temperature) {
            return Err(ConfigError::Invalid(format!(
                "TEMPERATURE {} is outside 0.0..=2.0",
                self.summarizer.temperature
            )));
        }
        // The speech endpoint always needs the OpenAI key.
        if self.endpoints.openai_key.trim().is_empty() {
            return Err(ConfigError::Invalid("OPENAI_KEY is empty".into()));
        }
        if self.summarizer.provider == ProviderKind::Anthropic
            && self.endpoints.claude_key.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "CLAUDE_KEY is empty but SELECTED_MODEL_TYPE is claude".into(),
            ));
        }
        if self.summarizer.provider == ProviderKind::Ollama
            && url::Url::parse(&self.endpoints.ollama_host).is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "OLLAMA_HOST '{}' is not a valid URL",
                self.endpoints.ollama_host
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_JSON: &str = r#"{
        "CLAUDE_KEY": "claude-test-key",
        "OPENAI_KEY": "openai-test-key",
        "OUTPUT_DIR": "/tmp/readit",
        "SELECTED_MODEL": "claude-3-opus-20240229",
        "SELECTED_MODEL_TYPE": "claude",
        "OLLAMA_HOST": "http://localhost:11434",
        "AUDIO_VOICE": "nova",
        "MAX_RESPONSE_TOKENS": "720"
    }"#;

    #[test]
    fn parses_original_json_format() {
        let config = Config::parse(SAMPLE_JSON, Format::Json).unwrap();
        assert_eq!(config.summarizer.provider, ProviderKind::Anthropic);
        assert_eq!(config.summarizer.model, "claude-3-opus-20240229");
        assert_eq!(config.summarizer.max_tokens, 720);
        assert_eq!(config.speech.voice, "nova");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/readit"));
        assert_eq!(config.endpoints.ollama_host, "http://localhost:11434");
    }

    #[test]
    fn optional_keys_take_defaults() {
        let config = Config::parse(SAMPLE_JSON, Format::Json).unwrap();
        assert_eq!(config.summarizer.temperature, 1.0);
        assert_eq!(config.summarizer.top_p, 1.0);
        assert_eq!(config.summarizer.frequency_penalty, 0.0);
        assert!(config.summarizer.system_prompt.is_none());
        assert_eq!(config.speech.model, "tts-1-hd");
        assert_eq!(config.endpoints.openai_base_url, "https://api.openai.com");
        assert_eq!(config.cue_dir, PathBuf::from("."));
        assert!(!config.strict_fetch);
        assert_eq!(config.playback_timeout_secs, 1800);
    }

    #[test]
    fn max_tokens_accepts_number() {
        let json = SAMPLE_JSON.replace(r#""720""#, "1024");
        let config = Config::parse(&json, Format::Json).unwrap();
        assert_eq!(config.summarizer.max_tokens, 1024);
    }

    #[test]
    fn max_tokens_rejects_garbage() {
        let json = SAMPLE_JSON.replace(r#""720""#, r#""lots""#);
        let err = Config::parse(&json, Format::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let json = SAMPLE_JSON.replace(r#""AUDIO_VOICE": "nova","#, "");
        let err = Config::parse(&json, Format::Json).unwrap_err();
        match err {
            ConfigError::Parse { message, .. } => assert!(message.contains("AUDIO_VOICE")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let json = SAMPLE_JSON.replace(r#""claude","#, r#""gemini","#);
        assert!(Config::parse(&json, Format::Json).is_err());
    }

    #[test]
    fn anthropic_alias_is_accepted() {
        let json = SAMPLE_JSON.replace(r#""claude","#, r#""anthropic","#);
        let config = Config::parse(&json, Format::Json).unwrap();
        assert_eq!(config.summarizer.provider, ProviderKind::Anthropic);
    }

    #[test]
    fn empty_claude_key_rejected_for_claude_provider() {
        let json = SAMPLE_JSON.replace("claude-test-key", "");
        let err = Config::parse(&json, Format::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn parses_yaml() {
        let yaml = r#"
CLAUDE_KEY: ""
OPENAI_KEY: sk-test
OUTPUT_DIR: /tmp/out
SELECTED_MODEL: llama3.2:3b
SELECTED_MODEL_TYPE: ollama
OLLAMA_HOST: http://10.0.0.5:11434
AUDIO_VOICE: alloy
MAX_RESPONSE_TOKENS: 512
STRICT_FETCH: true
"#;
        let config = Config::parse(yaml, Format::Yaml).unwrap();
        assert_eq!(config.summarizer.provider, ProviderKind::Ollama);
        assert_eq!(config.summarizer.max_tokens, 512);
        assert!(config.strict_fetch);
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE_JSON).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.summarizer.model, "claude-3-opus-20240229");
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "OPENAI_KEY: [unterminated").unwrap();

        match Config::load(Some(&path)).unwrap_err() {
            ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = Config::parse(SAMPLE_JSON, Format::Json).unwrap();
        let printed = format!("{:?}", config.endpoints);
        assert!(!printed.contains("openai-test-key"));
        assert!(printed.contains("<redacted>"));
    }
}
