use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use serde::Serialize;

use crate::chunk::{DEFAULT_MAX_CHARS, chunk};
use crate::config::ServiceConfig;

/// Returned to the user whenever summarization fails
pub const SUMMARY_FAILED: &str = "Summary failed. Check your API key or input.";

/// Texts shorter than this (in characters) are summarized in a single call
pub const SHORT_THRESHOLD: usize = 4000;

/// Delay between chunk calls, sized for trial-tier rate limits
pub const DEFAULT_PACING: Duration = Duration::from_secs(12);

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("no API key configured for the summarization service")]
    MissingApiKey,

    #[error("summarization service returned {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected summarization response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    Paragraph,
}

/// Body of one summarization call
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest<'a> {
    pub text: &'a str,
    pub model: &'a str,
    pub length: SummaryLength,
    pub format: SummaryFormat,
}

impl<'a> SummarizeRequest<'a> {
    pub fn new(text: &'a str, model: &'a str) -> Self {
        Self {
            text,
            model,
            length: SummaryLength::Medium,
            format: SummaryFormat::Paragraph,
        }
    }
}

/// A remote text summarization service
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummarizeRequest<'_>) -> Result<String, SummarizeError>;
}

/// Client for Cohere's `/v1/summarize` endpoint
#[derive(Debug, Clone)]
pub struct CohereClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl CohereClient {
    pub fn new(client: reqwest::Client, config: ServiceConfig) -> Self {
        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Summarizer for CohereClient {
    async fn summarize(&self, request: &SummarizeRequest<'_>) -> Result<String, SummarizeError> {
        let api_key = self.config.api_key.as_deref().ok_or(SummarizeError::MissingApiKey)?;

        let url = format!("{}/v1/summarize", self.config.api_base.trim_end_matches('/'));
        debug!("Summarizing {} chars via {url} with model {}", request.text.len(), request.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizeError::Api { status, body });
        }

        let json: serde_json::Value = resp.json().await?;
        extract_summary(&json)
    }
}

fn extract_summary(json: &serde_json::Value) -> Result<String, SummarizeError> {
    match json.get("summary").and_then(|s| s.as_str()) {
        Some(summary) => Ok(summary.trim().to_string()),
        None => Err(SummarizeError::InvalidResponse(
            "missing `summary` field in response".to_string(),
        )),
    }
}

/// Decides between a single call and paced, chunked calls.
///
/// Chunks are summarized strictly one after another, with `pacing` slept
/// between consecutive calls. Partial summaries are joined by a blank line.
#[derive(Debug)]
pub struct Orchestrator<S> {
    summarizer: S,
    model: String,
    max_chars: NonZeroUsize,
    short_threshold: usize,
    pacing: Duration,
}

impl<S: Summarizer> Orchestrator<S> {
    pub fn new(summarizer: S, model: impl Into<String>) -> Self {
        Self {
            summarizer,
            model: model.into(),
            max_chars: DEFAULT_MAX_CHARS,
            short_threshold: SHORT_THRESHOLD,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    pub fn with_max_chars(mut self, max_chars: NonZeroUsize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Summarize `text`, propagating the first service error
    pub async fn try_summarize(&self, text: &str) -> Result<String, SummarizeError> {
        if text.chars().count() < self.short_threshold {
            info!("Using single request for short transcript");
            return self.summarizer.summarize(&SummarizeRequest::new(text, &self.model)).await;
        }

        info!("Transcript too long, chunking and summarizing in parts");
        let chunks: Vec<String> = chunk(text, self.max_chars).collect();
        let mut partials = Vec::with_capacity(chunks.len());

        for (i, part) in chunks.iter().enumerate() {
            if i > 0 {
                debug!("Pacing {:?} before next chunk", self.pacing);
                tokio::time::sleep(self.pacing).await;
            }
            info!("Summarizing chunk {}/{}", i + 1, chunks.len());
            let summary = self.summarizer.summarize(&SummarizeRequest::new(part, &self.model)).await?;
            partials.push(summary);
        }

        Ok(partials.join("\n\n"))
    }

    /// Summarize `text`; any failure yields [`SUMMARY_FAILED`]
    pub async fn summarize(&self, text: &str) -> String {
        match self.try_summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Summarization failed: {e}");
                SUMMARY_FAILED.to_string()
            }
        }
    }
}
