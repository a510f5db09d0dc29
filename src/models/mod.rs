//! Core data models for bibliographic records and search operations.

mod record;
mod search;

pub use record::{doi_url, BibliographicRecord, RecordBuilder, UNTITLED};
pub use search::{
    AggregatedResults, SearchQuery, SourceFailure, SourceResponse, DEFAULT_PAGE_SIZE,
    DEFAULT_ROWS,
};
