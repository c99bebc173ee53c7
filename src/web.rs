//! Minimal HTML form in front of the pipeline.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use eyre::Result;
use html_escape::encode_text;
use log::info;
use serde::{Deserialize, Serialize};

use crate::pipeline::{INVALID_URL_MESSAGE, Pipeline, Report};
use crate::summarize::Summarizer;
use crate::transcript::CaptionService;

#[derive(Debug, Deserialize)]
pub struct VideoForm {
    #[serde(rename = "videoUrl", default)]
    pub video_url: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router<C, S>(pipeline: Arc<Pipeline<C, S>>) -> Router
where
    C: CaptionService + 'static,
    S: Summarizer + 'static,
{
    Router::new()
        .route("/", get(index).post(submit::<C, S>))
        .route("/health", get(health))
        .with_state(pipeline)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve<C, S>(pipeline: Arc<Pipeline<C, S>>, addr: SocketAddr) -> Result<()>
where
    C: CaptionService + 'static,
    S: Summarizer + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

async fn index() -> Html<String> {
    Html(render_page(&Report::default()))
}

async fn submit<C, S>(State(pipeline): State<Arc<Pipeline<C, S>>>, Form(form): Form<VideoForm>) -> Html<String>
where
    C: CaptionService + 'static,
    S: Summarizer + 'static,
{
    let url = form.video_url.unwrap_or_default();
    info!("Received video URL: {url}");

    let report = if url.trim().is_empty() {
        Report {
            error: Some(INVALID_URL_MESSAGE.to_string()),
            ..Report::default()
        }
    } else {
        pipeline.run(&url).await
    };

    Html(render_page(&report))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Render the form page with whatever sections `report` carries
pub fn render_page(report: &Report) -> String {
    let mut body = String::new();

    if let Some(ref error) = report.error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(error)));
    }
    if let Some(ref preview) = report.transcript_preview {
        body.push_str(&format!(
            "<h2>Transcript preview</h2>\n<pre class=\"transcript\">{}</pre>\n",
            encode_text(preview)
        ));
    }
    if let Some(ref summary) = report.summary {
        let paragraphs = summary
            .split("\n\n")
            .map(|p| format!("<p>{}</p>", encode_text(p)))
            .collect::<Vec<_>>()
            .join("\n");
        body.push_str(&format!("<h2>Summary</h2>\n<div class=\"summary\">\n{paragraphs}\n</div>\n"));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>YouTube Summarizer</title>
</head>
<body>
<h1>YouTube Summarizer</h1>
<form method="post" action="/">
<input type="text" name="videoUrl" placeholder="https://www.youtube.com/watch?v=..." required>
<button type="submit">Summarize</button>
</form>
{body}</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::{Orchestrator, SummarizeError, SummarizeRequest};
    use crate::transcript::{CaptionTrack, LanguagePlan, Transcript, TranscriptError};
    use crate::{Segment, VideoId};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct OneCaption;

    #[async_trait]
    impl CaptionService for OneCaption {
        async fn fetch(&self, video_id: &VideoId, _languages: &[String]) -> Result<Transcript, TranscriptError> {
            Ok(Transcript {
                video_id: video_id.clone(),
                language_code: "en".to_string(),
                is_generated: false,
                segments: vec![Segment {
                    text: "cats <3 boxes".to_string(),
                    start: 0.0,
                    duration: 2.0,
                }],
            })
        }

        async fn list_tracks(&self, _video_id: &VideoId) -> Result<Vec<CaptionTrack>, TranscriptError> {
            Ok(Vec::new())
        }

        async fn fetch_track(&self, track: &CaptionTrack) -> Result<Transcript, TranscriptError> {
            Err(TranscriptError::NoCaptionsAvailable(track.video_id.clone()))
        }
    }

    struct Echo;

    #[async_trait]
    impl Summarizer for Echo {
        async fn summarize(&self, request: &SummarizeRequest<'_>) -> Result<String, SummarizeError> {
            Ok(format!("about: {}", request.text))
        }
    }

    fn app() -> Router {
        let pipeline = Pipeline::new(OneCaption, Orchestrator::new(Echo, "command"), LanguagePlan::default());
        router(Arc::new(pipeline))
    }

    async fn body_string(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_form(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_render_empty_page() {
        let html = render_page(&Report::default());
        assert!(html.contains("name=\"videoUrl\""));
        // bare IDs and scheme-less URLs must not be rejected by the browser
        assert!(html.contains("<input type=\"text\" name=\"videoUrl\""));
        assert!(!html.contains("Summary</h2>"));
    }

    #[test]
    fn test_render_escapes_content() {
        let report = Report {
            transcript_preview: Some("<script>".to_string()),
            summary: Some("one\n\ntwo".to_string()),
            error: None,
        };
        let html = render_page(&report);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<p>one</p>\n<p>two</p>"));
    }

    #[tokio::test]
    async fn test_get_form() {
        let resp = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("<form"));
    }

    #[tokio::test]
    async fn test_post_summarizes() {
        let resp = app()
            .oneshot(post_form("videoUrl=https%3A%2F%2Fyoutu.be%2FABC123%3Fsi%3Dxyz"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_string(resp).await;
        assert!(html.contains("cats &lt;3 boxes"));
        assert!(html.contains("about: cats &lt;3 boxes"));
    }

    #[tokio::test]
    async fn test_post_invalid_url() {
        let resp = app()
            .oneshot(post_form("videoUrl=https%3A%2F%2Fexample.com%2Fvideo"))
            .await
            .unwrap();
        let html = body_string(resp).await;
        assert!(html.contains(INVALID_URL_MESSAGE));
        assert!(!html.contains("Summary</h2>"));
    }

    #[tokio::test]
    async fn test_post_missing_field() {
        let resp = app().oneshot(post_form("")).await.unwrap();
        assert!(body_string(resp).await.contains(INVALID_URL_MESSAGE));
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("\"status\":\"ok\""));
    }
}
