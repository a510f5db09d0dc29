//! Utility modules supporting the source adapters.
//!
//! - [`Transport`]: pluggable network fetch capability
//! - [`HttpClient`]: reqwest-backed [`Transport`]
//! - [`CorsProxy`]: URL-wrapping indirection in front of an upstream
//! - [`KeywordMatcher`], [`filter_by_keyword`], [`paginate`]: client-side filtering
//! - [`truncate_with_ellipsis`]: terminal display helper
//!
//! # Fetching through a proxy
//!
//! ```rust,no_run
//! use scholar_aggregator::utils::{CorsProxy, HttpClient, Transport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let proxy = CorsProxy::with_prefix("https://proxy.example.org/?url=");
//! let body = client
//!     .get_text("oai", &proxy.wrap("http://example.org/oai?verb=Identify"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod display;
mod filter;
mod http;
mod proxy;

pub use display::truncate_with_ellipsis;
pub use filter::{filter_by_keyword, paginate, KeywordMatcher};
pub use http::{HttpClient, Transport};
pub use proxy::CorsProxy;
