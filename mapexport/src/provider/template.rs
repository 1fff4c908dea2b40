//! Template-driven tile provider.
//!
//! Retrieves tiles from any slippy-map server described by a
//! [`TileSourceConfig`]: the tile's URL is built from the source template and
//! fetched with a single GET.

use crate::coord::TileIndex;
use crate::provider::{AsyncHttpClient, ProviderError};
use crate::source::{tile_url, TileSourceConfig};

/// Tile provider for one [`TileSourceConfig`].
///
/// # Example
///
/// ```ignore
/// use mapexport::provider::{AsyncReqwestClient, TemplateProvider};
/// use mapexport::source::TileSourceConfig;
///
/// let client = AsyncReqwestClient::new()?;
/// let provider = TemplateProvider::new(client, TileSourceConfig::osm());
/// let png = provider.download_tile(&tile).await?;
/// ```
pub struct TemplateProvider<C: AsyncHttpClient> {
    http_client: C,
    source: TileSourceConfig,
}

impl<C: AsyncHttpClient> TemplateProvider<C> {
    /// Creates a provider fetching from `source` through `http_client`.
    pub fn new(http_client: C, source: TileSourceConfig) -> Self {
        Self {
            http_client,
            source,
        }
    }

    /// Returns the provider's name for logging and identification.
    pub fn name(&self) -> &str {
        &self.source.display_name
    }

    /// Builds the tile URL for the given coordinates.
    #[inline]
    pub fn build_url(&self, tile: &TileIndex) -> String {
        tile_url(tile, &self.source)
    }

    /// Downloads the encoded image of one tile.
    pub async fn download_tile(&self, tile: &TileIndex) -> Result<Vec<u8>, ProviderError> {
        let url = self.build_url(tile);
        let data = self.http_client.get(&url).await?;
        if data.is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "empty body from {}",
                url
            )));
        }
        Ok(data)
    }
}
