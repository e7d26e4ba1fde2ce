//! Fetching RC pages from upstream sources.
//!
//! A [`Source`] never fails: transport errors, non-2xx statuses, and empty
//! pages all degrade to an empty [`Record`](crate::Record) plus a [`Metadata`]
//! entry describing what happened.

pub mod http_client;
pub mod sources;

pub use http_client::{HttpClient, RetryPolicy, ACCEPT_LANGUAGE, USER_AGENT};
pub use sources::{render_template, AggregatorSource, Source, VahanxSource};

use serde::Serialize;

/// Maximum number of characters of raw page kept for debug output.
pub const SNIPPET_CHARS: usize = 2000;

/// Errors from a single upstream request.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP client could not be built: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Diagnostic information about one source's fetch, surfaced in debug mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

impl Metadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach the leading [`SNIPPET_CHARS`] characters of `html`.
    pub fn with_snippet(mut self, html: &str) -> Self {
        self.html_snippet = Some(html.chars().take(SNIPPET_CHARS).collect());
        self
    }

    pub fn with_tried(mut self, tried: Vec<String>) -> Self {
        self.tried = Some(tried);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_is_truncated_on_char_boundary() {
        let html = "é".repeat(SNIPPET_CHARS + 10);
        let meta = Metadata::new("vahanx").with_snippet(&html);
        assert_eq!(meta.html_snippet.unwrap().chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn test_metadata_serializes_only_present_fields() {
        let meta = Metadata::new("vahanx").with_error("no-response");
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            serde_json::json!({"source": "vahanx", "error": "no-response"})
        );

        let meta = Metadata::new("aggregator").with_tried(vec![]);
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            serde_json::json!({"source": "aggregator", "tried": []})
        );
    }
}
