use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::scoring::TargetText;

pub const DEFAULT_ENDPOINT_URL: &str = "https://keymaster-8z9h.onrender.com/paragraph";

/// Query parameter appended to every request so caches never answer
pub const CACHE_BUST_PARAM: &str = "t";

/// The paragraph could not be obtained. Never fatal: the session stays idle
/// until the next restart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceUnavailable {
    #[error("could not reach paragraph service: {0}")]
    Transport(String),
    #[error("paragraph service answered with status {0}")]
    Status(u16),
    #[error("malformed paragraph payload: {0}")]
    Malformed(String),
}

/// Something that hands out paragraphs to type
pub trait ParagraphSource: Send + Sync + 'static {
    /// One attempt, no retries
    fn fetch(&self) -> Result<TargetText, SourceUnavailable>;
}

#[derive(Deserialize)]
struct ParagraphPayload {
    paragraph: String,
}

/// Extract the paragraph from a `{ "paragraph": "..." }` body
pub fn parse_payload(body: &str) -> Result<TargetText, SourceUnavailable> {
    serde_json::from_str::<ParagraphPayload>(body)
        .map(|payload| TargetText::new(payload.paragraph))
        .map_err(|e| SourceUnavailable::Malformed(e.to_string()))
}

pub fn cache_bust_url(base: &str, stamp: i64) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{CACHE_BUST_PARAM}={stamp}")
}

/// Fetches paragraphs from the remote endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpParagraphSource {
    url: String,
}

impl HttpParagraphSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ParagraphSource for HttpParagraphSource {
    fn fetch(&self) -> Result<TargetText, SourceUnavailable> {
        let url = cache_bust_url(&self.url, Utc::now().timestamp_millis());
        debug!(%url, "requesting paragraph");

        let body = ureq::get(url.as_str())
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => SourceUnavailable::Status(code),
                other => SourceUnavailable::Transport(format!("{}: {other}", self.url)),
            })?
            .into_body()
            .read_to_string()
            .map_err(|e| SourceUnavailable::Transport(format!("{}: {e}", self.url)))?;

        parse_payload(&body)
            .inspect_err(|e| warn!(url = %self.url, error = %e, "bad paragraph body"))
    }
}

/// Always yields the same text. Backs `--prompt`.
#[derive(Debug, Clone)]
pub struct FixedParagraphSource {
    text: String,
}

impl FixedParagraphSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ParagraphSource for FixedParagraphSource {
    fn fetch(&self) -> Result<TargetText, SourceUnavailable> {
        Ok(TargetText::new(&self.text))
    }
}
