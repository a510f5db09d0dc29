//! Concurrent fan-out over the enabled sources.

use futures_util::future::join_all;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::models::{AggregatedResults, SearchQuery, SourceFailure};
use crate::sources::{SourceError, SourceRegistry};

/// Runs a query against every enabled source and merges the outcomes
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: SourceRegistry,
}

impl Aggregator {
    /// Create an aggregator over an existing registry
    pub fn new(registry: SourceRegistry) -> Self {
        Self { registry }
    }

    /// Create an aggregator with the default sources built from `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(SourceRegistry::from_config(config)?))
    }

    /// The sources this aggregator fans out over
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Search every enabled source concurrently.
    ///
    /// Records are concatenated in registration order and `total` is the sum of
    /// the successful sources' totals. A failing source contributes nothing and
    /// is reported in `failures`; it never fails the whole search. Queries that
    /// are not searchable dispatch nothing.
    #[instrument(skip(self, query), fields(keyword = %query.keyword))]
    pub async fn search(&self, query: &SearchQuery) -> AggregatedResults {
        if !query.is_searchable() {
            info!("nothing to search");
            return AggregatedResults::default();
        }

        let sources = self.registry.enabled_for(query);
        let outcomes = join_all(sources.iter().map(|source| source.search(query))).await;

        let mut results = AggregatedResults {
            dispatched: sources.len(),
            ..AggregatedResults::default()
        };

        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(response) => {
                    results.total += response.total;
                    results.records.extend(response.records);
                }
                Err(e) => {
                    warn!("Search failed for {}: {}", source.id(), e);
                    results.failures.push(SourceFailure {
                        source: source.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            sources = results.dispatched,
            failed = results.failures.len(),
            records = results.records.len(),
            total = results.total,
            "aggregated search finished"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::make_record;
    use crate::sources::{MockSource, SourceKind};
    use std::sync::Arc;

    fn aggregator(harvester: MockSource, registry: MockSource) -> Aggregator {
        let mut sources = SourceRegistry::new();
        sources.register(Arc::new(harvester));
        sources.register(Arc::new(registry));
        Aggregator::new(sources)
    }

    fn records(prefix: &str, n: usize) -> Vec<crate::models::BibliographicRecord> {
        (0..n)
            .map(|i| make_record(&format!("{} {}", prefix, i), prefix))
            .collect()
    }

    #[tokio::test]
    async fn test_merges_in_registration_order() {
        let agg = aggregator(
            MockSource::harvester(records("oai", 2), 5),
            MockSource::registry(records("crossref", 3), 7),
        );

        let results = agg.search(&SearchQuery::new("agua")).await;

        assert_eq!(results.total, 12);
        assert_eq!(results.records.len(), 5);
        assert_eq!(results.records[0].title, "oai 0");
        assert_eq!(results.records[1].title, "oai 1");
        assert_eq!(results.records[2].title, "crossref 0");
        assert!(results.failures.is_empty());
        assert!(!results.all_failed());
    }

    #[tokio::test]
    async fn test_failed_source_contributes_nothing() {
        let agg = aggregator(
            MockSource::harvester(records("oai", 4), 40).failing("network unreachable"),
            MockSource::registry(records("crossref", 3), 3),
        );

        let results = agg.search(&SearchQuery::new("agua")).await;

        assert_eq!(results.total, 3);
        assert_eq!(results.records.len(), 3);
        assert!(results.records.iter().all(|r| r.source == "crossref"));
        assert_eq!(results.failures.len(), 1);
        assert_eq!(results.failures[0].source, "Mock Harvester");
        assert!(results.failures[0].message.contains("network unreachable"));
        assert!(!results.all_failed());
    }

    #[tokio::test]
    async fn test_all_sources_failing() {
        let agg = aggregator(
            MockSource::harvester(vec![], 0).failing("down"),
            MockSource::registry(vec![], 0).failing("down"),
        );

        let results = agg.search(&SearchQuery::new("agua")).await;

        assert!(results.is_empty());
        assert_eq!(results.total, 0);
        assert!(results.all_failed());
    }

    #[tokio::test]
    async fn test_switches_skip_sources() {
        let harvester = Arc::new(MockSource::harvester(records("oai", 1), 1));
        let registry = Arc::new(MockSource::registry(records("crossref", 1), 1));
        let mut sources = SourceRegistry::new();
        sources.register(harvester.clone());
        sources.register(registry.clone());
        let agg = Aggregator::new(sources);

        let results = agg
            .search(&SearchQuery::new("agua").use_harvester(false))
            .await;

        assert_eq!(results.total, 1);
        assert_eq!(results.records[0].source, "crossref");
        assert_eq!(harvester.calls(), 0);
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn test_unsearchable_query_dispatches_nothing() {
        let harvester = Arc::new(MockSource::new("h", "H", SourceKind::Harvester));
        let mut sources = SourceRegistry::new();
        sources.register(harvester.clone());
        let agg = Aggregator::new(sources);

        let blank = agg
            .search(&SearchQuery::new("   ").use_harvester(false))
            .await;
        let disabled = agg
            .search(
                &SearchQuery::new("agua")
                    .use_harvester(false)
                    .use_registry(false),
            )
            .await;

        for results in [blank, disabled] {
            assert!(results.is_empty());
            assert_eq!(results.total, 0);
            assert_eq!(results.dispatched, 0);
            assert!(!results.all_failed());
        }
        assert_eq!(harvester.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_search_is_stable() {
        let agg = aggregator(
            MockSource::harvester(records("oai", 2), 2),
            MockSource::registry(records("crossref", 2), 9),
        );
        let query = SearchQuery::new("agua");

        let first = agg.search(&query).await;
        let second = agg.search(&query).await;

        assert_eq!(first, second);
    }
}
