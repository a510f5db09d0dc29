//! Crossref works search, restricted to a set of DOI registrant prefixes.
//!
//! Used as a secondary route to a regional catalog (SciELO by default) whose
//! articles are registered under a known set of prefixes.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::config::{Config, RegistryConfig};
use crate::models::{BibliographicRecord, RecordBuilder, SearchQuery, SourceResponse};
use crate::sources::{Source, SourceError, SourceKind};
use crate::utils::{CorsProxy, Transport};

/// Crossref registry source
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    transport: Arc<dyn Transport>,
    proxy: CorsProxy,
    base_url: String,
    label: String,
    prefixes: Vec<String>,
    mailto: Option<String>,
}

impl CrossRefSource {
    /// Create a registry search from its configuration section
    pub fn new(config: &RegistryConfig, proxy: CorsProxy, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            proxy,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            label: config.label.clone(),
            prefixes: config.prefixes.clone(),
            mailto: config.mailto.clone().filter(|m| !m.trim().is_empty()),
        }
    }

    /// Create a registry search from the full configuration
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let proxy = if config.registry.use_proxy {
            config.proxy.clone()
        } else {
            CorsProxy::direct()
        };
        Self::new(&config.registry, proxy, transport)
    }

    /// Date bounds and registrant prefixes, comma-joined (Crossref ANDs
    /// different filter names and ORs repeated ones).
    ///
    /// Date bounds must stay `from-pub-date`/`until-pub-date`: Crossref has no
    /// plain `from-date`/`until-date` filter.
    fn filter(&self, query: &SearchQuery) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(from) = SearchQuery::format_date(query.date_from) {
            parts.push(format!("from-pub-date:{}", from));
        }
        if let Some(until) = SearchQuery::format_date(query.date_to) {
            parts.push(format!("until-pub-date:{}", until));
        }
        parts.extend(self.prefixes.iter().map(|p| format!("prefix:{}", p)));

        (!parts.is_empty()).then(|| parts.join(","))
    }

    fn search_url(&self, query: &SearchQuery) -> Result<String, SourceError> {
        let mut url = Url::parse(&format!("{}/works", self.base_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.keyword);
            pairs.append_pair("rows", &query.rows.to_string());
            if query.page > 1 {
                pairs.append_pair("offset", &((query.page - 1) * query.rows).to_string());
            }
            if let Some(filter) = self.filter(query) {
                pairs.append_pair("filter", &filter);
            }
            if let Some(mailto) = &self.mailto {
                pairs.append_pair("mailto", mailto);
            }
        }
        Ok(url.to_string())
    }

    fn parse_item(&self, item: CRItem) -> BibliographicRecord {
        let authors = item
            .author
            .iter()
            .filter_map(CRAuthor::display_name)
            .collect();

        let date = item
            .issued
            .as_ref()
            .and_then(|d| d.date_parts.first())
            .map(|parts| assemble_date(parts))
            .unwrap_or_default();

        RecordBuilder::new(item.title.first().unwrap_or_default(), self.label.as_str())
            .authors(authors)
            .date(date)
            .doi(item.doi.unwrap_or_default())
            .url(item.url.unwrap_or_default())
            .journal(item.container_title.first().unwrap_or_default())
            .build()
    }
}

/// Assemble `YYYY-MM-DD` from Crossref `date-parts`.
///
/// Missing month or day default to 1; no year yields an empty string.
pub fn assemble_date(parts: &[Option<i64>]) -> String {
    let part = |i: usize| parts.get(i).copied().flatten();

    match part(0) {
        Some(year) => format!(
            "{}-{:02}-{:02}",
            year,
            part(1).unwrap_or(1),
            part(2).unwrap_or(1)
        ),
        None => String::new(),
    }
}

#[async_trait]
impl Source for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Registry
    }

    async fn search(&self, query: &SearchQuery) -> Result<SourceResponse, SourceError> {
        let url = self.search_url(query)?;
        let body = self
            .transport
            .get_text(self.id(), &self.proxy.wrap(&url))
            .await?;

        let data: CRResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Crossref JSON: {}", e)))?;

        let returned = data.message.items.len();
        let total = data.message.total_results.unwrap_or(returned);
        let records: Vec<BibliographicRecord> = data
            .message
            .items
            .into_iter()
            .map(|item| self.parse_item(item))
            .collect();

        info!(source = %self.label, returned, total, "registry search finished");

        Ok(SourceResponse::new(records, self.label.as_str()).total(total))
    }
}

// ===== Crossref API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: CRMessage,
}

#[derive(Debug, Deserialize)]
struct CRMessage {
    #[serde(rename = "total-results")]
    total_results: Option<usize>,
    #[serde(default)]
    items: Vec<CRItem>,
}

/// Crossref returns most text fields as arrays of variants
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextList {
    One(String),
    Many(Vec<String>),
}

impl Default for TextList {
    fn default() -> Self {
        TextList::Many(Vec::new())
    }
}

impl TextList {
    fn first(&self) -> Option<String> {
        match self {
            TextList::One(s) => Some(s.clone()),
            TextList::Many(v) => v.first().cloned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CRItem {
    #[serde(default)]
    title: TextList,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(default)]
    author: Vec<CRAuthor>,
    issued: Option<CRDate>,
    #[serde(rename = "container-title", default)]
    container_title: TextList,
}

#[derive(Debug, Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
    /// Organisational contributors carry a single name
    name: Option<String>,
}

impl CRAuthor {
    fn display_name(&self) -> Option<String> {
        let joined = [self.given.as_deref(), self.family.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !joined.is_empty() {
            return Some(joined);
        }

        self.name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i64>>>,
}
