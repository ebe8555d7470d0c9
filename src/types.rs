//! Values passed between pipeline stages.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::PipelineError;

/// One invocation's inputs. Built once from the command line.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    url: Url,
    output_dir: PathBuf,
    fixed_filename: Option<String>,
    download_only: bool,
    silent: bool,
}

impl PipelineRequest {
    pub fn new(
        url: &str,
        output_dir: impl Into<PathBuf>,
        fixed_filename: Option<String>,
        download_only: bool,
        silent: bool,
    ) -> Result<Self, PipelineError> {
        let url = Url::parse(url).map_err(|e| PipelineError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            url,
            output_dir: output_dir.into(),
            fixed_filename,
            download_only,
            silent,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn fixed_filename(&self) -> Option<&str> {
        self.fixed_filename.as_deref()
    }

    pub fn download_only(&self) -> bool {
        self.download_only
    }

    pub fn silent(&self) -> bool {
        self.silent
    }
}

/// Visible text of a fetched page, or the failure text in fail-soft mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub raw_text: String,
}

impl PageContent {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.raw_text.split_whitespace().count()
    }

    /// Rough token count: four characters per token.
    pub fn estimated_tokens(&self) -> usize {
        self.raw_text.chars().count() / 4
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
}

/// The generated audio file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub file_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_unparseable_url() {
        let err = PipelineRequest::new("not a url", "/tmp", None, false, false).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidUrl { .. }));
    }

    #[test]
    fn request_keeps_flags() {
        let req = PipelineRequest::new(
            "https://example.com/a",
            "/tmp/out",
            Some("fixed.mp3".into()),
            true,
            true,
        )
        .unwrap();
        assert_eq!(req.url().as_str(), "https://example.com/a");
        assert_eq!(req.output_dir(), Path::new("/tmp/out"));
        assert_eq!(req.fixed_filename(), Some("fixed.mp3"));
        assert!(req.download_only());
        assert!(req.silent());
    }

    #[test]
    fn word_count_and_token_estimate() {
        let page = PageContent::new("one two  three\nfour");
        assert_eq!(page.word_count(), 4);
        assert_eq!(page.estimated_tokens(), 19 / 4);
    }
}
