//! # Scholar Aggregator
//!
//! Aggregated academic literature search over an OAI-PMH repository and the
//! Crossref works API.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (BibliographicRecord, SearchQuery, etc.)
//! - [`sources`]: Source adapters behind the [`Source`] trait
//! - [`aggregator`]: Concurrent fan-out and merging of source results
//! - [`utils`]: HTTP transport, CORS proxy wrapping, keyword filtering
//! - [`config`]: Configuration management

pub mod aggregator;
pub mod config;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use models::{AggregatedResults, BibliographicRecord, SearchQuery};
pub use sources::{Source, SourceError, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
