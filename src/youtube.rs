use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::transcript::{CaptionService, CaptionTrack, LanguagePreference, Transcript, TranscriptError, select_track};
use crate::{Segment, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<RawCaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct RawCaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    kind: Option<String>,
}

/// Caption client backed by YouTube's InnerTube API
#[derive(Debug, Clone)]
pub struct InnerTubeClient {
    client: reqwest::Client,
}

impl InnerTubeClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn player_response(&self, video_id: &VideoId) -> Result<serde_json::Value, TranscriptError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id.as_str()
        });

        let json = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(json)
    }
}

#[async_trait]
impl CaptionService for InnerTubeClient {
    async fn fetch(&self, video_id: &VideoId, languages: &[String]) -> Result<Transcript, TranscriptError> {
        let tracks = self.list_tracks(video_id).await?;
        let track = track_for_languages(video_id, &tracks, languages)?;
        self.fetch_track(track).await
    }

    async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, TranscriptError> {
        let json = self.player_response(video_id).await?;
        parse_caption_tracks(video_id, json)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Transcript, TranscriptError> {
        debug!("Using caption track: lang={} generated={}", track.language_code, track.is_generated);

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_caption_xml(&caption_xml)?;

        Ok(Transcript {
            video_id: track.video_id.clone(),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated,
            segments,
        })
    }
}

/// Pick the track for the first of `languages` the video offers.
///
/// A miss is `NoTranscriptFound`, which is what lets the retriever fall back;
/// a video without any tracks never reaches this point.
fn track_for_languages<'a>(
    video_id: &VideoId,
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Result<&'a CaptionTrack, TranscriptError> {
    let preferences: Vec<LanguagePreference> = languages.iter().map(|l| LanguagePreference::Code(l.clone())).collect();

    select_track(tracks, &preferences).ok_or_else(|| TranscriptError::NoTranscriptFound {
        video_id: video_id.clone(),
        languages: languages.to_vec(),
    })
}

fn extract_api_key(html: &str) -> Result<String, TranscriptError> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).map_err(|e| TranscriptError::Parse(e.to_string()))?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).map_err(|e| TranscriptError::Parse(e.to_string()))?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    Err(TranscriptError::Parse(
        "could not extract InnerTube API key from watch page".to_string(),
    ))
}

/// Turn an InnerTube player response into the video's caption tracks
fn parse_caption_tracks(video_id: &VideoId, json: serde_json::Value) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let resp: InnerTubePlayerResponse =
        serde_json::from_value(json).map_err(|e| TranscriptError::Parse(format!("player response: {e}")))?;

    if let Some(status) = resp.playability_status {
        let state = status.status.unwrap_or_default();
        if state != "OK" && !state.is_empty() {
            return Err(TranscriptError::VideoUnavailable {
                video_id: video_id.clone(),
                reason: status.reason.unwrap_or(state),
            });
        }
    }

    let tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TranscriptError::TranscriptsDisabled(video_id.clone()));
    }

    Ok(tracks
        .into_iter()
        .map(|t| CaptionTrack {
            video_id: video_id.clone(),
            is_generated: t.kind.as_deref() == Some("asr"),
            language_code: t.language_code,
            base_url: t.base_url.replace("&fmt=srv3", ""),
        })
        .collect())
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>, TranscriptError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = Some(dur.unwrap_or_default());
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: dur,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TranscriptError::Parse(format!("caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}
