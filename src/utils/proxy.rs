//! CORS indirection layer.
//!
//! Some deployments can only reach an upstream through a URL-rewriting proxy.
//! [`CorsProxy::wrap`] turns a target URL into the URL that is actually fetched;
//! with no prefix configured the target is fetched directly.

use serde::{Deserialize, Serialize};

/// URL-wrapping proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsProxy {
    /// Proxy prefix, e.g. `https://proxy.example.org/?url=`
    #[serde(default)]
    pub prefix: Option<String>,

    /// Percent-encode the target before appending it to the prefix
    #[serde(default = "default_true")]
    pub encode_target: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CorsProxy {
    fn default() -> Self {
        Self::direct()
    }
}

impl CorsProxy {
    /// No indirection
    pub fn direct() -> Self {
        Self {
            prefix: None,
            encode_target: true,
        }
    }

    /// Proxy with the given prefix, encoding targets
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            encode_target: true,
        }
    }

    /// Set whether the target is percent-encoded
    pub fn encode_target(mut self, encode: bool) -> Self {
        self.encode_target = encode;
        self
    }

    /// Rewrite `url` so it is fetched through the proxy
    pub fn wrap(&self, url: &str) -> String {
        match self.prefix.as_deref().map(str::trim) {
            None | Some("") => url.to_string(),
            Some(prefix) if self.encode_target => {
                format!("{}{}", prefix, urlencoding::encode(url))
            }
            Some(prefix) => format!("{}{}", prefix, url),
        }
    }
}
