use async_trait::async_trait;
use log::{debug, info, warn};

use crate::{Segment, VideoId};

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(VideoId),

    #[error("no transcript for video {video_id} in languages {languages:?}")]
    NoTranscriptFound { video_id: VideoId, languages: Vec<String> },

    #[error("no captions available for video {0} in any preferred language")]
    NoCaptionsAvailable(VideoId),

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: VideoId, reason: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Parse(String),
}

/// One caption track offered for a video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub video_id: VideoId,
    pub language_code: String,
    pub is_generated: bool,
    pub base_url: String,
}

/// An entry in the ordered fallback list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagePreference {
    Code(String),
    /// Any auto-generated track, whatever its language
    AutoGenerated,
}

impl LanguagePreference {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "auto" => LanguagePreference::AutoGenerated,
            code => LanguagePreference::Code(code.to_string()),
        }
    }
}

/// Primary language plus the fallback list tried when it is missing
#[derive(Debug, Clone)]
pub struct LanguagePlan {
    pub primary: String,
    pub fallback: Vec<LanguagePreference>,
}

impl Default for LanguagePlan {
    fn default() -> Self {
        Self {
            primary: "en".to_string(),
            fallback: ["en", "ta", "hi", "auto"].into_iter().map(LanguagePreference::parse).collect(),
        }
    }
}

/// Caption text for a video, ordered as spoken
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: VideoId,
    pub language_code: String,
    pub is_generated: bool,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// All segment texts joined by single spaces
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
    }
}

/// Source of caption data
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Fetch the transcript in the first of `languages` the video offers.
    async fn fetch(&self, video_id: &VideoId, languages: &[String]) -> Result<Transcript, TranscriptError>;

    /// List every caption track the video offers.
    async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, TranscriptError>;

    /// Fetch the segments of one specific track.
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Transcript, TranscriptError>;
}

/// Pick the first track matching the ordered preferences.
///
/// For a language code, manually created tracks win over auto-generated ones.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferences: &[LanguagePreference]) -> Option<&'a CaptionTrack> {
    preferences.iter().find_map(|pref| match pref {
        LanguagePreference::Code(code) => tracks
            .iter()
            .find(|t| !t.is_generated && &t.language_code == code)
            .or_else(|| tracks.iter().find(|t| t.is_generated && &t.language_code == code)),
        LanguagePreference::AutoGenerated => tracks.iter().find(|t| t.is_generated),
    })
}

/// Retrieve the transcript for a video, falling back through `plan` when the
/// primary language is missing. Disabled captions end the attempt at once.
pub async fn fetch_transcript<C>(service: &C, video_id: &VideoId, plan: &LanguagePlan) -> Result<Transcript, TranscriptError>
where
    C: CaptionService + ?Sized,
{
    match service.fetch(video_id, std::slice::from_ref(&plan.primary)).await {
        Ok(transcript) => Ok(transcript),
        Err(TranscriptError::NoTranscriptFound { .. }) => {
            info!("No '{}' transcript for {video_id}, trying fallback options", plan.primary);
            let tracks = service.list_tracks(video_id).await?;
            debug!(
                "Available tracks: {:?}",
                tracks.iter().map(|t| (&t.language_code, t.is_generated)).collect::<Vec<_>>()
            );
            let track = select_track(&tracks, &plan.fallback)
                .ok_or_else(|| TranscriptError::NoCaptionsAvailable(video_id.clone()))?;
            debug!("Using fallback track: lang={} generated={}", track.language_code, track.is_generated);
            service.fetch_track(track).await
        }
        Err(e @ TranscriptError::TranscriptsDisabled(_)) => {
            warn!("Transcripts are disabled for {video_id}");
            Err(e)
        }
        Err(e) => Err(e),
    }
}
