//! OAI-PMH repository harvester.
//!
//! OAI-PMH has no keyword search: the adapter lists every record in the date
//! window, filters the batch by keyword on the client side and paginates in
//! memory.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::config::{Config, HarvesterConfig};
use crate::models::{BibliographicRecord, SearchQuery, SourceResponse};
use crate::sources::{parse_oai_dc, Source, SourceError, SourceKind};
use crate::utils::{filter_by_keyword, paginate, CorsProxy, Transport};

/// OAI-PMH harvester source
#[derive(Debug, Clone)]
pub struct OaiPmhSource {
    transport: Arc<dyn Transport>,
    proxy: CorsProxy,
    base_url: String,
    label: String,
    metadata_prefix: String,
    max_batches: usize,
}

impl OaiPmhSource {
    /// Create a harvester from its configuration section
    pub fn new(config: &HarvesterConfig, proxy: CorsProxy, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            proxy,
            base_url: config.base_url.clone(),
            label: config.label.clone(),
            metadata_prefix: config.metadata_prefix.clone(),
            max_batches: config.max_batches.max(1),
        }
    }

    /// Create a harvester from the full configuration
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let proxy = if config.harvester.use_proxy {
            config.proxy.clone()
        } else {
            CorsProxy::direct()
        };
        Self::new(&config.harvester, proxy, transport)
    }

    /// Build the initial `ListRecords` request for the query's date window
    fn list_records_url(&self, query: &SearchQuery) -> Result<String, SourceError> {
        let mut params = vec![
            ("verb", "ListRecords".to_string()),
            ("metadataPrefix", self.metadata_prefix.clone()),
        ];
        if let Some(from) = SearchQuery::format_date(query.date_from) {
            params.push(("from", from));
        }
        if let Some(until) = SearchQuery::format_date(query.date_to) {
            params.push(("until", until));
        }

        Ok(Url::parse_with_params(&self.base_url, &params)?.to_string())
    }

    /// Follow-up requests carry only the verb and the resumption token
    fn resume_url(&self, token: &str) -> Result<String, SourceError> {
        let params = [("verb", "ListRecords"), ("resumptionToken", token)];
        Ok(Url::parse_with_params(&self.base_url, &params)?.to_string())
    }

    /// Fetch every record of the date window, up to `max_batches` batches
    async fn harvest(&self, query: &SearchQuery) -> Result<Vec<BibliographicRecord>, SourceError> {
        let mut url = self.list_records_url(query)?;
        let mut records = Vec::new();

        for batch in 1..=self.max_batches {
            let body = self
                .transport
                .get_text(self.id(), &self.proxy.wrap(&url))
                .await?;

            let doc = parse_oai_dc(&body, &self.label)?;

            if let Some(error) = doc.error {
                if error.is_no_records_match() {
                    debug!(source = %self.label, "no records in window");
                    break;
                }
                return Err(SourceError::Retrieval {
                    source_id: self.id().to_string(),
                    message: format!("{} reported OAI-PMH error {}", self.label, error),
                });
            }

            debug!(
                source = %self.label,
                batch,
                records = doc.records.len(),
                complete_list_size = ?doc.complete_list_size,
                "harvested batch"
            );
            records.extend(doc.records);

            match doc.resumption_token {
                Some(token) if batch < self.max_batches => url = self.resume_url(&token)?,
                _ => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl Source for OaiPmhSource {
    fn id(&self) -> &str {
        "oai"
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Harvester
    }

    async fn search(&self, query: &SearchQuery) -> Result<SourceResponse, SourceError> {
        let harvested = self.harvest(query).await?;
        let harvested_count = harvested.len();

        let filtered = filter_by_keyword(harvested, &query.keyword)?;
        let (records, total) = paginate(filtered, query.page, query.page_size);

        info!(
            source = %self.label,
            harvested = harvested_count,
            matched = total,
            returned = records.len(),
            "harvester search finished"
        );

        Ok(SourceResponse::new(records, self.label.as_str()).total(total))
    }
}
