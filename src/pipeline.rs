//! Pipeline orchestration with a linear stage machine.
//!
//! START → FETCHING → SUMMARIZING → SYNTHESIZING → PLAYING → DONE
//!
//! PLAYING is skipped in download-only mode. Cue sounds play before the
//! first three stages unless the run is silent.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PipelineError, PlaybackError};
use crate::fetcher::{ContentFetcher, FetchPolicy};
use crate::filename::derive_filename;
use crate::player::{AudioPlayer, RodioPlayer};
use crate::summarizer::{self, Summarizer};
use crate::tts::{OpenAiSpeech, SpeechSynthesizer};
use crate::types::{AudioArtifact, PipelineRequest, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Fetching,
    Summarizing,
    Synthesizing,
    Playing,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::Fetching => write!(f, "FETCHING"),
            Self::Summarizing => write!(f, "SUMMARIZING"),
            Self::Synthesizing => write!(f, "SYNTHESIZING"),
            Self::Playing => write!(f, "PLAYING"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// Short progress sounds, looked up in the cue directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    GettingContent,
    Summarizing,
    GeneratingAudio,
}

impl Cue {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::GettingContent => "gettingcontent.mp3",
            Self::Summarizing => "summary.mp3",
            Self::GeneratingAudio => "genaudio.mp3",
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub summary: Summary,
    pub artifact: AudioArtifact,
    pub played: bool,
}

pub struct Pipeline {
    fetcher: ContentFetcher,
    summarizer: Arc<dyn Summarizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    voice: String,
    cue_dir: PathBuf,
    stage: Stage,
}

impl Pipeline {
    pub fn new(
        fetcher: ContentFetcher,
        summarizer: Arc<dyn Summarizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
        voice: impl Into<String>,
        cue_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            synthesizer,
            player,
            voice: voice.into(),
            cue_dir: cue_dir.into(),
            stage: Stage::Start,
        }
    }

    /// Wire the production components from configuration.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let policy = if config.strict_fetch {
            FetchPolicy::Strict
        } else {
            FetchPolicy::FailSoft
        };
        let timeout = Duration::from_secs(config.endpoints.request_timeout_secs);

        Ok(Self::new(
            ContentFetcher::new(policy, timeout)?,
            summarizer::from_config(config)?.into(),
            Arc::new(OpenAiSpeech::new(&config.endpoints, &config.speech)?),
            Arc::new(RodioPlayer::new(Duration::from_secs(
                config.playback_timeout_secs,
            ))),
            config.speech.voice.clone(),
            config.cue_dir.clone(),
        ))
    }

    #[cfg(test)]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage once, in order.
    pub async fn run(&mut self, request: &PipelineRequest) -> Result<RunReport, PipelineError> {
        self.cue(Cue::GettingContent, request).await?;
        self.transition(Stage::Fetching);
        let content = self.fetcher.fetch(request.url()).await?;
        info!("Word Count from page: {}", content.word_count());
        info!("Tokens Estimate: {}", content.estimated_tokens());

        let artifact = AudioArtifact {
            file_path: request.output_dir().join(output_filename(request)),
        };
        info!("Filepath path: {}", artifact.file_path.display());

        self.cue(Cue::Summarizing, request).await?;
        self.transition(Stage::Summarizing);
        info!(
            "Summarizing: {} ({} / {})",
            request.url(),
            self.summarizer.kind(),
            self.summarizer.model()
        );
        let summary = self.summarizer.summarize(&content).await?;
        debug!("{}: {}", self.summarizer.model(), summary.text);
        println!("SUMMARY: {}", summary.text);

        self.cue(Cue::GeneratingAudio, request).await?;
        self.transition(Stage::Synthesizing);
        self.synthesizer
            .synthesize(&summary.text, &self.voice, &artifact.file_path)
            .await?;
        info!("Audio generated!");

        let played = if request.download_only() {
            info!("Download only, not playing {}", artifact.file_path.display());
            false
        } else {
            self.transition(Stage::Playing);
            info!("Now Playing.");
            self.play(&artifact.file_path).await?;
            true
        };

        self.transition(Stage::Done);
        info!("Done!");

        Ok(RunReport {
            summary,
            artifact,
            played,
        })
    }

    fn transition(&mut self, next: Stage) {
        info!("State: {} → {}", self.stage, next);
        self.stage = next;
    }

    async fn cue(&self, cue: Cue, request: &PipelineRequest) -> Result<(), PlaybackError> {
        if request.silent() {
            return Ok(());
        }
        self.play(&self.cue_dir.join(cue.file_name())).await
    }

    async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let player = Arc::clone(&self.player);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || player.play(&path))
            .await
            .map_err(|e| PlaybackError::Join(e.to_string()))?
    }
}

/// The override verbatim when given, otherwise the name derived from the URL.
fn output_filename(request: &PipelineRequest) -> String {
    match request.fixed_filename() {
        Some(name) => name.to_string(),
        None => derive_filename(request.url()),
    }
}
