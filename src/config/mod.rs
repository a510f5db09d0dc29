//! Configuration management.
//!
//! Configuration is read from an optional TOML file and overridden by
//! environment variables prefixed with `SCHOLAR_AGGREGATOR_` (nested keys use
//! `__`, e.g. `SCHOLAR_AGGREGATOR_HARVESTER__BASE_URL`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [harvester]
//! base_url = "http://148.215.1.70/redalyc/oai"
//! label = "Redalyc"
//! metadata_prefix = "oai_dc"
//! max_batches = 1
//! use_proxy = true
//!
//! [registry]
//! base_url = "https://api.crossref.org"
//! label = "SciELO (via Crossref)"
//! prefixes = ["10.1590", "10.4025", "10.11606", "10.18634", "10.17533"]
//! mailto = "librarian@example.org"
//!
//! [search]
//! page_size = 50
//! rows = 50
//!
//! [proxy]
//! prefix = "https://proxy.example.org/?url="
//! encode_target = true
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{DEFAULT_PAGE_SIZE, DEFAULT_ROWS};
use crate::utils::CorsProxy;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SCHOLAR_AGGREGATOR";

/// Config file name looked up by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "scholar-aggregator.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OAI-PMH repository harvester
    #[serde(default)]
    pub harvester: HarvesterConfig,

    /// DOI registry search
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Query defaults
    #[serde(default)]
    pub search: SearchDefaults,

    /// CORS indirection
    #[serde(default)]
    pub proxy: CorsProxy,

    /// HTTP transport
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OAI-PMH harvester configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvesterConfig {
    /// OAI-PMH endpoint
    #[serde(default = "default_oai_base")]
    pub base_url: String,

    /// Provenance label stamped on records
    #[serde(default = "default_oai_label")]
    pub label: String,

    /// Metadata format requested from the repository
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,

    /// Maximum number of ListRecords batches to follow via resumption tokens
    #[serde(default = "default_max_batches")]
    pub max_batches: usize,

    /// Route requests through `[proxy]`
    #[serde(default = "default_true")]
    pub use_proxy: bool,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            base_url: default_oai_base(),
            label: default_oai_label(),
            metadata_prefix: default_metadata_prefix(),
            max_batches: default_max_batches(),
            use_proxy: true,
        }
    }
}

fn default_oai_base() -> String {
    "http://148.215.1.70/redalyc/oai".to_string()
}

fn default_oai_label() -> String {
    "Redalyc".to_string()
}

fn default_metadata_prefix() -> String {
    "oai_dc".to_string()
}

fn default_max_batches() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Registry search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Crossref API base
    #[serde(default = "default_registry_base")]
    pub base_url: String,

    /// Provenance label stamped on records
    #[serde(default = "default_registry_label")]
    pub label: String,

    /// DOI registrant prefixes the search is restricted to.
    ///
    /// Accepts a list or a comma-separated string, so the environment can set
    /// it as `SCHOLAR_AGGREGATOR_REGISTRY__PREFIXES=10.1590,10.4025`.
    #[serde(default = "default_prefixes", deserialize_with = "deserialize_prefixes")]
    pub prefixes: Vec<String>,

    /// Contact address for Crossref's polite pool
    #[serde(default)]
    pub mailto: Option<String>,

    /// Route requests through `[proxy]`
    #[serde(default)]
    pub use_proxy: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base(),
            label: default_registry_label(),
            prefixes: default_prefixes(),
            mailto: None,
            use_proxy: false,
        }
    }
}

fn default_registry_base() -> String {
    "https://api.crossref.org".to_string()
}

fn default_registry_label() -> String {
    "SciELO (via Crossref)".to_string()
}

fn default_prefixes() -> Vec<String> {
    ["10.1590", "10.4025", "10.11606", "10.18634", "10.17533"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    List(Vec<String>),
    One(String),
}

fn deserialize_prefixes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match StringOrList::deserialize(deserializer)? {
        StringOrList::List(values) => values,
        StringOrList::One(joined) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(values
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect())
}

/// Defaults applied to queries that don't set them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    /// Harvester page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Registry result cap
    #[serde(default = "default_rows")]
    pub rows: usize,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            rows: default_rows(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` for structured output, anything else for human-readable
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Whether JSON log output was requested
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Values stay strings (prefixes like `10.1590` must not become floats);
/// serde converts numeric and boolean fields on deserialization.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment variables and defaults
pub fn get_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("scholar-aggregator").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.harvester.label, "Redalyc");
        assert_eq!(config.harvester.metadata_prefix, "oai_dc");
        assert_eq!(config.harvester.max_batches, 1);
        assert_eq!(config.registry.base_url, "https://api.crossref.org");
        assert_eq!(config.registry.prefixes.len(), 5);
        assert_eq!(config.search.page_size, 50);
        assert_eq!(config.search.rows, 50);
        assert!(config.proxy.prefix.is_none());
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            r#"
[harvester]
base_url = "http://localhost:8080/oai"
max_batches = 3

[registry]
prefixes = ["10.1590"]
mailto = "team@example.org"

[search]
page_size = 20

[proxy]
prefix = "https://proxy.example/"
encode_target = false

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.harvester.base_url, "http://localhost:8080/oai");
        assert_eq!(config.harvester.max_batches, 3);
        assert_eq!(config.harvester.label, "Redalyc");
        assert_eq!(config.registry.prefixes, vec!["10.1590".to_string()]);
        assert_eq!(config.registry.mailto.as_deref(), Some("team@example.org"));
        assert_eq!(config.search.page_size, 20);
        assert_eq!(config.search.rows, 50);
        assert_eq!(config.proxy.prefix.as_deref(), Some("https://proxy.example/"));
        assert!(!config.proxy.encode_target);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.is_json());
    }

    fn config_from_env(vars: &[(&str, &str)]) -> Config {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        config::Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_env_single_prefix() {
        let config = config_from_env(&[("SCHOLAR_AGGREGATOR_REGISTRY__PREFIXES", "10.1590")]);
        assert_eq!(config.registry.prefixes, vec!["10.1590".to_string()]);
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from_env(&[
            ("SCHOLAR_AGGREGATOR_REGISTRY__PREFIXES", "10.1590, 10.11606"),
            ("SCHOLAR_AGGREGATOR_HARVESTER__MAX_BATCHES", "4"),
            ("SCHOLAR_AGGREGATOR_HARVESTER__USE_PROXY", "false"),
            ("SCHOLAR_AGGREGATOR_HTTP__TIMEOUT_SECS", "5"),
            ("SCHOLAR_AGGREGATOR_PROXY__PREFIX", "https://proxy.example/?url="),
        ]);

        assert_eq!(
            config.registry.prefixes,
            vec!["10.1590".to_string(), "10.11606".to_string()]
        );
        assert_eq!(config.harvester.max_batches, 4);
        assert!(!config.harvester.use_proxy);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(
            config.proxy.prefix.as_deref(),
            Some("https://proxy.example/?url=")
        );
        assert_eq!(config.harvester.label, "Redalyc");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/scholar-aggregator.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "invalid = toml = content").unwrap();

        assert!(load_config(file.path()).is_err());
    }
}
