//! URL to summary flow shared by the web form and the CLI.

use log::{debug, info, warn};

use crate::output::preview;
use crate::summarize::{Orchestrator, SummarizeError, Summarizer};
use crate::transcript::{CaptionService, LanguagePlan, Transcript, TranscriptError, fetch_transcript};

pub const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL.";

pub const TRANSCRIPT_FAILED_MESSAGE: &str =
    "Could not fetch transcript. Make sure the video has captions and is publicly accessible.";

/// Characters of transcript shown back to the user
pub const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("could not extract a video ID from '{0}'")]
    InvalidUrl(String),

    #[error("transcripts are disabled for this video")]
    TranscriptsDisabled,

    #[error("no captions available in any preferred language")]
    NoCaptionsAvailable,

    #[error("transcript fetch failed: {0}")]
    Transcript(TranscriptError),

    #[error("summarization failed: {0}")]
    SummarizationServiceFailure(#[from] SummarizeError),
}

impl From<TranscriptError> for PipelineError {
    fn from(e: TranscriptError) -> Self {
        match e {
            TranscriptError::TranscriptsDisabled(_) => PipelineError::TranscriptsDisabled,
            TranscriptError::NoCaptionsAvailable(_) => PipelineError::NoCaptionsAvailable,
            other => PipelineError::Transcript(other),
        }
    }
}

impl PipelineError {
    /// Fixed message shown to end users
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidUrl(_) => INVALID_URL_MESSAGE,
            PipelineError::SummarizationServiceFailure(_) => crate::summarize::SUMMARY_FAILED,
            _ => TRANSCRIPT_FAILED_MESSAGE,
        }
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub transcript_preview: Option<String>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

pub struct Pipeline<C, S> {
    captions: C,
    orchestrator: Orchestrator<S>,
    languages: LanguagePlan,
}

impl<C: CaptionService, S: Summarizer> Pipeline<C, S> {
    pub fn new(captions: C, orchestrator: Orchestrator<S>, languages: LanguagePlan) -> Self {
        Self {
            captions,
            orchestrator,
            languages,
        }
    }

    /// Summarize an already fetched transcript, surfacing service errors
    pub async fn try_summary(&self, transcript: &Transcript) -> Result<String, PipelineError> {
        Ok(self.orchestrator.try_summarize(&transcript.text()).await?)
    }

    /// Resolve `url` to a video and fetch its transcript
    pub async fn transcript_for(&self, url: &str) -> Result<Transcript, PipelineError> {
        let video_id = crate::extract_video_id(url).ok_or_else(|| PipelineError::InvalidUrl(url.trim().to_string()))?;
        info!("Extracted video ID: {video_id}");

        let transcript = fetch_transcript(&self.captions, &video_id, &self.languages).await?;
        info!(
            "Fetched {} segments, {} chars (lang={}, generated={})",
            transcript.segments.len(),
            transcript.text().chars().count(),
            transcript.language_code,
            transcript.is_generated
        );
        Ok(transcript)
    }

    /// Run the whole flow, converting every failure into a renderable report
    pub async fn run(&self, url: &str) -> Report {
        let transcript = match self.transcript_for(url).await {
            Ok(t) => t,
            Err(e) => {
                warn!("{e}");
                return Report {
                    error: Some(e.user_message().to_string()),
                    ..Report::default()
                };
            }
        };

        let text = transcript.text();
        debug!("Transcript (first 200 chars): {}", preview(&text, 200));

        Report {
            transcript_preview: Some(preview(&text, PREVIEW_CHARS).to_string()),
            summary: Some(self.orchestrator.summarize(&text).await),
            error: None,
        }
    }
}
