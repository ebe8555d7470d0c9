//! readit-rs: fetch a web page, summarize it with an LLM and read it aloud.

mod config;
mod error;
mod fetcher;
mod filename;
mod pipeline;
mod player;
mod summarizer;
mod tts;
mod types;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::PipelineError;

/// Large discussion thread, handy for manual testing.
const DEFAULT_URL: &str = "https://news.ycombinator.com/item?id=39865810";

#[derive(Parser, Debug)]
#[command(name = "readit-rs", about = "READIT To ME: summarize a web page and read it aloud")]
struct Args {
    /// URL of the webpage to summarize
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Write the audio file without playing it
    #[arg(long)]
    download_only: bool,

    /// Skip the progress cue sounds
    #[arg(long)]
    silent: bool,

    /// Output filename to use instead of one derived from the URL
    #[arg(long)]
    fixed_filename: Option<String>,

    /// Path to config.json or config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging (suppress noisy HTTP/audio internals)
    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=warn,reqwest=warn,rodio=warn,symphonia=warn")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn,rodio=warn,symphonia=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), PipelineError> {
    info!("READIT To ME 1.0");

    let config = config::Config::load(args.config.as_deref())?;
    info!(
        "Env: SELECTED_MODEL:{}, AUDIO_VOICE:{}, MAX_TOKENS:{}",
        config.summarizer.model, config.speech.voice, config.summarizer.max_tokens
    );

    let request = types::PipelineRequest::new(
        &args.url,
        config.output_dir.clone(),
        args.fixed_filename,
        args.download_only,
        args.silent,
    )?;

    let mut pipeline = pipeline::Pipeline::from_config(&config)?;
    let report = pipeline.run(&request).await?;
    info!(
        "Saved {} ({} chars of summary, played: {})",
        report.artifact.file_path.display(),
        report.summary.text.chars().count(),
        report.played
    );

    Ok(())
}
