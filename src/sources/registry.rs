//! Registry of the source adapters an aggregated search fans out over.

use std::sync::Arc;

use super::{CrossRefSource, OaiPmhSource, Source, SourceError};
use crate::config::Config;
use crate::models::SearchQuery;
use crate::utils::{HttpClient, Transport};

/// Ordered collection of source adapters
///
/// Registration order is the order in which results are merged.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the harvester and the registry search
    /// configured from `config`, sharing one HTTP client
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpClient::from_config(&config.http)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create the default pair of sources over the given transport
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OaiPmhSource::from_config(
            config,
            Arc::clone(&transport),
        )));
        registry.register(Arc::new(CrossRefSource::from_config(config, transport)));
        registry
    }

    /// Register a new source after the existing ones
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.push(source);
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Get all registered sources
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    /// Get all source IDs
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.id())
    }

    /// Sources the query switches on, in registration order
    pub fn enabled_for(&self, query: &SearchQuery) -> Vec<Arc<dyn Source>> {
        self.sources
            .iter()
            .filter(|s| s.kind().enabled_by(query))
            .cloned()
            .collect()
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
