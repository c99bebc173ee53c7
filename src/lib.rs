pub mod chunk;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcript;
pub mod web;
pub mod youtube;

use url::Url;

/// A single captioned segment
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Opaque YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn to_video_id(candidate: &str) -> Option<VideoId> {
    if !candidate.is_empty() && candidate.chars().all(is_id_char) {
        Some(VideoId(candidate.to_string()))
    } else {
        None
    }
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com")
}

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    // Bare 11-character video ID
    if input.len() == 11 && input.chars().all(is_id_char) {
        return Some(VideoId(input.to_string()));
    }

    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{input}")).ok()?,
        Err(_) => return None,
    };
    let host = url.host_str()?.to_ascii_lowercase();

    // youtu.be/ID
    if host == "youtu.be" || host == "www.youtu.be" {
        let id = url.path_segments()?.find(|s| !s.is_empty())?;
        return to_video_id(id);
    }

    if !is_youtube_host(&host) {
        return None;
    }

    // youtube.com/watch?v=ID
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        return to_video_id(&v);
    }

    // youtube.com/embed/ID, /shorts/ID, /live/ID
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    match segments.next()? {
        "embed" | "shorts" | "live" => to_video_id(segments.next()?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Option<String> {
        extract_video_id(s).map(|v| v.to_string())
    }

    #[test]
    fn test_bare_video_id() {
        assert_eq!(id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(id("https://www.youtube.com/watch?v=ABC123&t=30s"), Some("ABC123".to_string()));
    }

    #[test]
    fn test_watch_url_v_not_first() {
        assert_eq!(
            id("https://www.youtube.com/watch?feature=share&v=ABC123"),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_watch_url_without_scheme() {
        assert_eq!(id("youtube.com/watch?v=ABC123"), Some("ABC123".to_string()));
    }

    #[test]
    fn test_mobile_host() {
        assert_eq!(id("https://m.youtube.com/watch?v=ABC123"), Some("ABC123".to_string()));
    }

    #[test]
    fn test_short_url() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_short_url_with_query() {
        assert_eq!(id("https://youtu.be/ABC123?si=xyz"), Some("ABC123".to_string()));
    }

    #[test]
    fn test_short_url_with_extra_path() {
        assert_eq!(id("https://youtu.be/ABC123/extra"), Some("ABC123".to_string()));
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(id("https://www.youtube.com/embed/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_without_v() {
        assert_eq!(id("https://www.youtube.com/watch"), None);
        assert_eq!(id("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_other_host() {
        assert_eq!(id("https://example.com/video"), None);
        assert_eq!(id("https://example.com/watch?v=ABC123"), None);
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(id("not-a-valid-id"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(id(""), None);
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }
}
