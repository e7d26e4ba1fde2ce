//! Upstream RC lookup sources.

use super::{FetchError, HttpClient, Metadata};
use crate::record::Record;
use crate::scan::scan_html;
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

/// Placeholder replaced by the RC number in aggregator URL templates.
pub const RC_PLACEHOLDER: &str = "{rc}";

/// One place RC details can be scraped from.
#[async_trait]
pub trait Source: Send + Sync {
    /// Short name used as the debug metadata key.
    fn name(&self) -> &str;

    /// Look up `rc_number`. Never fails; failures yield an empty record.
    async fn fetch(&self, rc_number: &str) -> (Record, Metadata);
}

/// The vahanx RC search page, `{base}/rc-search/{rc}`.
#[derive(Debug, Clone)]
pub struct VahanxSource {
    client: HttpClient,
    base_url: String,
}

impl VahanxSource {
    pub const NAME: &'static str = "vahanx";
    pub const DEFAULT_BASE_URL: &'static str = "https://vahanx.in";

    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the search URL, percent-encoding the RC number as one segment.
    pub fn search_url(&self, rc_number: &str) -> Result<Url, FetchError> {
        let invalid = || FetchError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("rc-search")
            .push(rc_number);
        Ok(url)
    }
}

/// Substitute `rc_number` into an aggregator template.
///
/// The RC number is percent-encoded as a single path segment, the same way
/// [`VahanxSource::search_url`] encodes it.
pub fn render_template(template: &str, rc_number: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidUrl(template.to_string());
    let mut scratch = Url::parse("http://localhost/").map_err(|_| invalid())?;
    scratch
        .path_segments_mut()
        .map_err(|_| invalid())?
        .clear()
        .push(rc_number);
    let encoded = scratch.path().trim_start_matches('/');
    Url::parse(&template.replace(RC_PLACEHOLDER, encoded)).map_err(|_| invalid())
}

#[async_trait]
impl Source for VahanxSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, rc_number: &str) -> (Record, Metadata) {
        let meta = Metadata::new(Self::NAME);
        let url = match self.search_url(rc_number) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "cannot build search URL");
                return (Record::new(), meta.with_error("invalid-url"));
            }
        };

        match self.client.get_text(url.as_str()).await {
            Ok(html) => {
                let record = scan_html(&html);
                info!(source = Self::NAME, rc_number, fields = record.len(), "page scanned");
                (record, meta.with_snippet(&html))
            }
            Err(_) => (Record::new(), meta.with_error("no-response")),
        }
    }
}

/// Public aggregator pages given as URL templates containing `{rc}`.
///
/// Templates are tried in order and every reachable page is scanned; results
/// merge with first-found-wins. With no templates configured the source
/// contributes nothing.
#[derive(Debug, Clone)]
pub struct AggregatorSource {
    client: HttpClient,
    templates: Vec<String>,
}

impl AggregatorSource {
    pub const NAME: &'static str = "aggregator";

    pub fn new(client: HttpClient, templates: Vec<String>) -> Self {
        Self { client, templates }
    }
}

#[async_trait]
impl Source for AggregatorSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, rc_number: &str) -> (Record, Metadata) {
        let mut record = Record::new();
        let mut tried = Vec::with_capacity(self.templates.len());
        let mut reached = 0usize;

        for template in &self.templates {
            let url = match render_template(template, rc_number) {
                Ok(url) => url,
                Err(e) => {
                    debug!(error = %e, "skipping aggregator template");
                    tried.push(template.clone());
                    continue;
                }
            };
            tried.push(url.to_string());
            if let Ok(html) = self.client.get_text(url.as_str()).await {
                reached += 1;
                record.absorb(&scan_html(&html));
            }
        }

        let mut meta = Metadata::new(Self::NAME);
        if !tried.is_empty() && reached == 0 {
            meta = meta.with_error("no-response");
        }
        (record, meta.with_tried(tried))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RetryPolicy;

    fn client() -> HttpClient {
        HttpClient::new(RetryPolicy::default()).unwrap()
    }

    #[test]
    fn test_search_url() {
        let source = VahanxSource::new(client(), "https://vahanx.in");
        assert_eq!(
            source.search_url("MH12AB1234").unwrap().as_str(),
            "https://vahanx.in/rc-search/MH12AB1234"
        );

        let source = VahanxSource::new(client(), "http://localhost:8080/");
        assert_eq!(
            source.search_url("A/B").unwrap().as_str(),
            "http://localhost:8080/rc-search/A%2FB"
        );
    }

    #[test]
    fn test_search_url_rejects_bad_base() {
        let source = VahanxSource::new(client(), "not a url");
        assert!(matches!(
            source.search_url("X"),
            Err(FetchError::InvalidUrl(base)) if base == "not a url"
        ));
    }

    #[test]
    fn test_render_template_encodes_rc_number() {
        assert_eq!(
            render_template("https://rc.example/v/{rc}?src=free", "MH12AB1234")
                .unwrap()
                .as_str(),
            "https://rc.example/v/MH12AB1234?src=free"
        );
        assert_eq!(
            render_template("https://rc.example/v/{rc}", "A/B?x#y")
                .unwrap()
                .as_str(),
            "https://rc.example/v/A%2FB%3Fx%23y"
        );
    }

    #[test]
    fn test_render_template_rejects_bad_template() {
        assert!(matches!(
            render_template("no scheme {rc}", "X"),
            Err(FetchError::InvalidUrl(t)) if t == "no scheme {rc}"
        ));
    }

    #[tokio::test]
    async fn test_aggregator_bad_template_counts_as_tried() {
        let source = AggregatorSource::new(client(), vec!["::{rc}".to_string()]);
        let (record, meta) = source.fetch("X").await;
        assert!(record.is_empty());
        assert_eq!(meta.error.as_deref(), Some("no-response"));
        assert_eq!(meta.tried.unwrap(), vec!["::{rc}".to_string()]);
    }

    #[tokio::test]
    async fn test_aggregator_without_templates_is_empty() {
        let source = AggregatorSource::new(client(), vec![]);
        let (record, meta) = source.fetch("MH12AB1234").await;
        assert!(record.is_empty());
        assert_eq!(meta, Metadata::new("aggregator").with_tried(vec![]));
    }
}
