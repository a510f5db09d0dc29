//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{BibliographicRecord, RecordBuilder, SearchQuery, SourceResponse};
use crate::sources::{Source, SourceError, SourceKind};

/// A mock source for testing that returns a predefined outcome.
///
/// Without a configured outcome it answers with an empty response.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    name: String,
    kind: SourceKind,
    outcome: Mutex<Option<Result<SourceResponse, String>>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            outcome: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock harvester that answers with `records` and `total`.
    pub fn harvester(records: Vec<BibliographicRecord>, total: usize) -> Self {
        let source = Self::new("mock-harvester", "Mock Harvester", SourceKind::Harvester);
        source.set_response(SourceResponse::new(records, "Mock Harvester").total(total));
        source
    }

    /// Mock registry that answers with `records` and `total`.
    pub fn registry(records: Vec<BibliographicRecord>, total: usize) -> Self {
        let source = Self::new("mock-registry", "Mock Registry", SourceKind::Registry);
        source.set_response(SourceResponse::new(records, "Mock Registry").total(total));
        source
    }

    /// Set the search response to return.
    pub fn set_response(&self, response: SourceResponse) {
        if let Ok(mut guard) = self.outcome.lock() {
            *guard = Some(Ok(response));
        }
    }

    /// Make every search fail with a transport error carrying `message`.
    pub fn set_failure(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.outcome.lock() {
            *guard = Some(Err(message.into()));
        }
    }

    /// Builder form of [`set_failure`](Self::set_failure).
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.set_failure(message);
        self
    }

    /// Number of searches this source has served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn search(&self, _query: &SearchQuery) -> Result<SourceResponse, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let outcome = self
            .outcome
            .lock()
            .map_err(|e| SourceError::Transport(format!("mock poisoned: {}", e)))?
            .clone();

        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(SourceError::Transport(message)),
            None => Ok(SourceResponse::new(Vec::new(), self.name.as_str())),
        }
    }
}

/// Helper function to create a mock record for testing.
pub fn make_record(title: &str, source: &str) -> BibliographicRecord {
    RecordBuilder::new(title, source)
        .url(format!("http://example.com/{}", title.replace(' ', "-")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_outcome_is_empty() {
        let source = MockSource::new("m", "Mock", SourceKind::Registry);
        let response = source.search(&SearchQuery::new("x")).await.unwrap();

        assert!(response.records.is_empty());
        assert_eq!(response.total, 0);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_outcome() {
        let source = MockSource::harvester(vec![], 0).failing("offline");
        let err = source.search(&SearchQuery::new("x")).await.unwrap_err();

        assert!(matches!(err, SourceError::Transport(ref m) if m == "offline"));
    }
}
