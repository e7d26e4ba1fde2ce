//! One RC lookup across all configured sources.

use std::sync::Arc;

use rc_lookup::{merge, AggregatorSource, HttpClient, Metadata, Record, Source, VahanxSource};
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Result of querying every source for one RC number.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub rc_number: String,
    /// Merged details; empty when no source found anything.
    pub details: Record,
    /// Per-source metadata keyed by [`Source::name`], in query order.
    pub sources: Vec<(String, Metadata)>,
}

impl LookupOutcome {
    /// Metadata reported by the source called `name`.
    pub fn metadata(&self, name: &str) -> Option<&Metadata> {
        self.sources
            .iter()
            .find(|(source, _)| source == name)
            .map(|(_, meta)| meta)
    }
}

/// Queries sources one after the other and merges their records. Earlier
/// sources take precedence.
pub struct LookupService {
    sources: Vec<Arc<dyn Source>>,
}

impl LookupService {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    /// The vahanx page first, then the aggregators, over one shared HTTP client.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let client = HttpClient::new(config.retry)?;
        let vahanx: Arc<dyn Source> =
            Arc::new(VahanxSource::new(client.clone(), config.base_url.clone()));
        let aggregator: Arc<dyn Source> =
            Arc::new(AggregatorSource::new(client, config.aggregators.clone()));
        Ok(Self::new(vec![vahanx, aggregator]))
    }

    /// Look up an already-normalized RC number.
    pub async fn lookup(&self, rc_number: &str) -> LookupOutcome {
        let mut records = Vec::with_capacity(self.sources.len());
        let mut sources = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let (record, meta) = source.fetch(rc_number).await;
            records.push(record);
            sources.push((source.name().to_string(), meta));
        }
        let details = merge(&records);

        info!(
            rc_number,
            fields = details.len(),
            failed = sources.iter().filter(|(_, m)| m.error.is_some()).count(),
            "lookup finished"
        );

        LookupOutcome {
            rc_number: rc_number.to_string(),
            details,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed {
        name: &'static str,
        record: Record,
    }

    #[async_trait]
    impl Source for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _rc_number: &str) -> (Record, Metadata) {
            (self.record.clone(), Metadata::new(self.name))
        }
    }

    fn fixed(name: &'static str, pairs: &[(&str, &str)]) -> Arc<dyn Source> {
        Arc::new(Fixed {
            name,
            record: pairs.iter().copied().collect(),
        })
    }

    #[tokio::test]
    async fn test_primary_source_wins() {
        let service = LookupService::new(vec![
            fixed("vahanx", &[("Fuel", "PETROL")]),
            fixed("aggregator", &[("Fuel", "DIESEL"), ("Colour", "RED")]),
        ]);
        let outcome = service.lookup("MH12AB1234").await;
        assert_eq!(outcome.rc_number, "MH12AB1234");
        assert_eq!(outcome.details.get("Fuel"), Some("PETROL"));
        assert_eq!(outcome.details.get("Colour"), Some("RED"));
        assert_eq!(outcome.metadata("vahanx").unwrap().source, "vahanx");
        assert_eq!(outcome.metadata("aggregator").unwrap().source, "aggregator");
    }

    #[tokio::test]
    async fn test_sources_reported_in_query_order() {
        let service = LookupService::new(vec![fixed("b", &[]), fixed("a", &[])]);
        let outcome = service.lookup("X").await;
        let names: Vec<&str> = outcome.sources.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(outcome.metadata("c").is_none());
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let service = LookupService::new(vec![fixed("vahanx", &[]), fixed("aggregator", &[])]);
        assert!(service.lookup("X").await.details.is_empty());
    }
}
