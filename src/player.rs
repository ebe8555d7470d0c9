//! Blocking MP3 playback through rodio.
//!
//! `play` returns only after the sink has drained, or fails once the
//! configured timeout passes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::error::PlaybackError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub trait AudioPlayer: Send + Sync {
    /// Play `path` to the end, blocking the calling thread.
    fn play(&self, path: &Path) -> Result<(), PlaybackError>;
}

pub struct RodioPlayer {
    timeout: Duration,
}

impl RodioPlayer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // Decode before touching the output device so a bad file fails fast.
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;
        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);

        debug!("Playing {}", path.display());
        let started = Instant::now();
        while !sink.empty() {
            if started.elapsed() >= self.timeout {
                sink.stop();
                return Err(PlaybackError::Timeout {
                    path: path.to_path_buf(),
                    secs: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
        debug!(
            "Finished {} after {:.1}s",
            path.display(),
            started.elapsed().as_secs_f64()
        );

        Ok(())
    }
}
