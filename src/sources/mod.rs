//! Source adapters with a shared trait-based interface.
//!
//! This module defines the [`Source`] trait that every adapter implements.
//! Two adapters ship with the crate:
//!
//! - [`OaiPmhSource`]: harvests an OAI-PMH repository (Redalyc by default) and
//!   filters the harvested batch by keyword on the client side
//! - [`CrossRefSource`]: searches the Crossref works API restricted to a set of
//!   DOI registrant prefixes (SciELO by default)
//!
//! Adapters are collected in a [`SourceRegistry`], which the
//! [`Aggregator`](crate::Aggregator) fans out over.
//!
//! # Errors
//!
//! Adapters fail with a [`SourceError`]:
//!
//! - `Transport` - the request could not complete (network down, proxy down)
//! - `Retrieval` - the upstream answered with a non-success status
//! - `Parse` - the body does not match the expected schema
//!
//! The aggregator catches all of them per adapter; none of them aborts the
//! other adapters.

mod crossref;
pub mod mock;
mod oai_dc;
mod oai_pmh;
mod registry;

pub use crossref::{assemble_date, CrossRefSource};
pub use mock::MockSource;
pub use oai_dc::{parse_oai_dc, OaiDocument, OaiError};
pub use oai_pmh::OaiPmhSource;
pub use registry::SourceRegistry;

use crate::models::{SearchQuery, SourceResponse};
use async_trait::async_trait;

/// Which query switch enables a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Metadata-harvesting repository
    Harvester,
    /// DOI-registration search
    Registry,
}

impl SourceKind {
    /// Whether `query` enables sources of this kind
    pub fn enabled_by(&self, query: &SearchQuery) -> bool {
        match self {
            SourceKind::Harvester => query.use_harvester,
            SourceKind::Registry => query.use_registry,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Harvester => write!(f, "harvester"),
            SourceKind::Registry => write!(f, "registry"),
        }
    }
}

/// The Source trait defines the interface for all source adapters.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "oai", "crossref")
    fn id(&self) -> &str;

    /// Human-readable name, also stamped on records as their provenance
    fn name(&self) -> &str;

    /// Which query switch enables this source
    fn kind(&self) -> SourceKind;

    /// Search for records matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SourceResponse, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The fetch itself could not complete
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status
    #[error("Retrieval error from {source_id}: {message}")]
    Retrieval { source_id: String, message: String },

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::InvalidRequest(format!("URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_enabled_by() {
        let query = SearchQuery::new("x").use_registry(false);
        assert!(SourceKind::Harvester.enabled_by(&query));
        assert!(!SourceKind::Registry.enabled_by(&query));
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::Retrieval {
            source_id: "oai".to_string(),
            message: "status 500".to_string(),
        };
        assert_eq!(err.to_string(), "Retrieval error from oai: status 500");
    }
}
