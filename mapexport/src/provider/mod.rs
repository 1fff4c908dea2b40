//! Tile provider abstraction
//!
//! This module provides the HTTP client seam and the template-driven
//! provider that downloads raw tile images from a slippy-map server.
//!
//! ```ignore
//! use mapexport::provider::{AsyncReqwestClient, TemplateProvider};
//! use mapexport::source::TileSourceConfig;
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let provider = TemplateProvider::new(http_client, TileSourceConfig::osm());
//! ```

mod http;
mod template;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_USER_AGENT};
pub use template::TemplateProvider;
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
