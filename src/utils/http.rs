//! HTTP transport used by the source adapters.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Network fetch capability.
///
/// Implementations fail with [`SourceError::Transport`] when the request cannot
/// complete and with [`SourceError::Retrieval`] when the server answers with a
/// non-success status; otherwise they yield the body as text.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// GET `url` and return the response body
    async fn get_text(&self, source: &str, url: &str) -> Result<String, SourceError>;
}

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a new HTTP client from configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        let user_agent = config.user_agent.clone().unwrap_or_else(|| {
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
        });

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get_text(&self, source: &str, url: &str) -> Result<String, SourceError> {
        tracing::debug!(source, url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("Failed to query {}: {}", source, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Retrieval {
                source_id: source.to_string(),
                message: format!("{} returned status: {}", source, status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("Failed to read response: {}", e)))
    }
}
