//! Search request and response models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::BibliographicRecord;

/// Default harvester page size
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default registry result cap
pub const DEFAULT_ROWS: usize = 50;

/// Search query shared by every source adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Keyword (may be empty)
    pub keyword: String,

    /// Lower date bound (inclusive)
    pub date_from: Option<NaiveDate>,

    /// Upper date bound (inclusive)
    pub date_to: Option<NaiveDate>,

    /// Whether the repository harvester runs
    pub use_harvester: bool,

    /// Whether the registry search runs
    pub use_registry: bool,

    /// 1-based page number
    pub page: usize,

    /// Harvester page size
    pub page_size: usize,

    /// Registry result cap
    pub rows: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            date_from: None,
            date_to: None,
            use_harvester: true,
            use_registry: true,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            rows: DEFAULT_ROWS,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().trim().to_string(),
            ..Default::default()
        }
    }

    /// Set lower date bound
    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    /// Set upper date bound
    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Enable/disable the repository harvester
    pub fn use_harvester(mut self, enabled: bool) -> Self {
        self.use_harvester = enabled;
        self
    }

    /// Enable/disable the registry search
    pub fn use_registry(mut self, enabled: bool) -> Self {
        self.use_registry = enabled;
        self
    }

    /// Set page number (values below 1 are clamped to 1)
    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set harvester page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set registry result cap
    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Whether the keyword is blank
    pub fn has_keyword(&self) -> bool {
        !self.keyword.trim().is_empty()
    }

    /// Whether this query may be dispatched at all.
    ///
    /// At least one source must be enabled. A blank keyword is only allowed
    /// when the harvester runs, since it lists by date window.
    pub fn is_searchable(&self) -> bool {
        (self.use_harvester || self.use_registry) && (self.has_keyword() || self.use_harvester)
    }

    /// Date bound formatted as `YYYY-MM-DD`
    pub(crate) fn format_date(date: Option<NaiveDate>) -> Option<String> {
        date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Outcome of a single source adapter call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResponse {
    /// Records of the requested page
    pub records: Vec<BibliographicRecord>,

    /// Total number of matching results reported by the source
    pub total: usize,

    /// Source that produced the records
    pub source: String,
}

impl SourceResponse {
    /// Create a new response; total defaults to the record count
    pub fn new(records: Vec<BibliographicRecord>, source: impl Into<String>) -> Self {
        Self {
            total: records.len(),
            records,
            source: source.into(),
        }
    }

    /// Set total results
    pub fn total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }
}

/// A source that failed during an aggregated search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Source identifier
    pub source: String,

    /// Human-readable reason
    pub message: String,
}

/// Merged results of an aggregated search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResults {
    /// Records from all successful sources, in source order
    pub records: Vec<BibliographicRecord>,

    /// Sum of successful sources' totals
    pub total: usize,

    /// Sources that failed; they contribute nothing to records or total
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,

    /// Number of sources dispatched
    #[serde(skip)]
    pub dispatched: usize,
}

impl AggregatedResults {
    /// Whether sources were dispatched and every one of them failed
    pub fn all_failed(&self) -> bool {
        self.dispatched > 0 && self.failures.len() == self.dispatched
    }

    /// Whether there are no records to show
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
