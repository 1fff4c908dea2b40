//! Region export implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::format::{encode_png, EncodedImage, OutputFormat};
use super::raster::{decode_tile, OutputRaster};
use super::types::{
    ExportError, ExportProgress, ExportRequest, ProgressCallback, TileFetchFailure,
};
use crate::config::ExportConfig;
use crate::coord::{build_tile_grid, TileGrid, TileIndex};
use crate::provider::{AsyncHttpClient, ProviderError, TemplateProvider};

/// Exports map regions by fetching their tiles and compositing one image.
///
/// Every tile of the grid is requested without waiting on the others (up to
/// `max_concurrent` in flight), each with its own timeout. The export joins
/// all of them; a single failed tile fails the export and no image is
/// produced.
///
/// # Example
///
/// ```ignore
/// use mapexport::compositor::{ExportRequest, TileCompositor};
/// use mapexport::config::ExportConfig;
/// use mapexport::provider::AsyncReqwestClient;
///
/// let compositor = TileCompositor::new(AsyncReqwestClient::new()?, ExportConfig::default());
/// let image = compositor.export_region(&request).await?;
/// std::fs::write(image.file_name(), image.bytes())?;
/// ```
pub struct TileCompositor<C: AsyncHttpClient> {
    http_client: C,
    config: ExportConfig,
    progress: Option<ProgressCallback>,
}

impl<C> TileCompositor<C>
where
    C: AsyncHttpClient + Clone + 'static,
{
    pub fn new(http_client: C, config: ExportConfig) -> Self {
        Self {
            http_client,
            config,
            progress: None,
        }
    }

    /// Registers a callback invoked after each tile settles.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Validates a request and computes its tile grid without any I/O.
    pub fn plan(&self, request: &ExportRequest) -> Result<TileGrid, ExportError> {
        let bounds = request.bounds.as_ref().ok_or_else(|| {
            ExportError::InvalidSelection("no region selected".to_string())
        })?;

        if !request.format.is_supported() {
            return Err(ExportError::UnsupportedFormat(format!(
                "{} export is not implemented",
                request.format
            )));
        }

        bounds
            .validate()
            .map_err(|e| ExportError::InvalidSelection(e.to_string()))?;
        self.config.validate()?;

        let grid = build_tile_grid(bounds, request.zoom);
        let limit = self.config.tile_limit();
        if grid.tile_count() > limit {
            return Err(ExportError::GridTooLarge {
                tiles: grid.tile_count(),
                max: limit,
            });
        }
        Ok(grid)
    }

    /// Exports the requested region.
    pub async fn export_region(&self, request: &ExportRequest) -> Result<EncodedImage, ExportError> {
        self.export_region_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Exports the requested region, aborting when `cancel` fires.
    ///
    /// On cancellation all outstanding fetches are aborted, the partially
    /// filled raster is dropped and [`ExportError::Cancelled`] is returned.
    pub async fn export_region_with_cancel(
        &self,
        request: &ExportRequest,
        cancel: CancellationToken,
    ) -> Result<EncodedImage, ExportError> {
        let start_time = Instant::now();
        let grid = self.plan(request)?;
        let tile_size = self.config.tile_size();
        let total = grid.tile_count();

        let mut raster = OutputRaster::new(grid, tile_size)?;
        let provider = Arc::new(TemplateProvider::new(
            self.http_client.clone(),
            request.source.clone(),
        ));

        debug!(
            source = provider.name(),
            zoom = %request.zoom,
            columns = grid.columns(),
            rows = grid.rows(),
            tiles = total,
            "Starting region export"
        );
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent()));
        let timeout = self.config.request_timeout();

        let mut downloads = JoinSet::new();
        for tile in grid.tiles() {
            downloads.spawn(fetch_tile(
                Arc::clone(&provider),
                tile,
                tile_size,
                timeout,
                Arc::clone(&limiter),
            ));
        }

        let mut failures: Vec<TileFetchFailure> = Vec::new();
        let mut progress = ExportProgress {
            loaded: 0,
            failed: 0,
            total,
        };

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    downloads.abort_all();
                    info!(
                        settled = progress.settled(),
                        total,
                        "Export cancelled"
                    );
                    return Err(ExportError::Cancelled);
                }
                joined = downloads.join_next() => joined,
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(Ok((tile, tile_image))) => {
                    // The image is discarded once any tile has failed
                    if failures.is_empty() {
                        raster.place(&tile, &tile_image)?;
                    }
                    progress.loaded += 1;
                    debug!(
                        tile = %tile,
                        loaded = progress.loaded,
                        total,
                        "Loaded {}/{} tiles",
                        progress.loaded,
                        total
                    );
                }
                Ok(Err(failure)) => {
                    warn!(
                        tile = %failure.tile,
                        url = %failure.url,
                        error = %failure.error,
                        "Tile download failed"
                    );
                    progress.failed += 1;
                    failures.push(failure);
                }
                Err(join_err) => {
                    downloads.abort_all();
                    return Err(ExportError::Internal(format!(
                        "tile task failed: {}",
                        join_err
                    )));
                }
            }

            if let Some(callback) = &self.progress {
                callback(progress);
            }
        }

        if !failures.is_empty() {
            failures.sort_by_key(|f| (f.tile.x(), f.tile.y()));
            warn!(
                failed = failures.len(),
                total, "Export failed, discarding partial image"
            );
            return Err(ExportError::PartialTileFailure {
                failed: failures,
                total,
            });
        }

        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        debug_assert!(raster.is_complete());

        let (width, height) = (raster.width(), raster.height());
        let data = encode_raster(raster.into_image(), request.format).await?;

        info!(
            source = %request.source,
            zoom = %request.zoom,
            width,
            height,
            bytes = data.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Region export complete"
        );

        Ok(EncodedImage {
            format: request.format,
            zoom: request.zoom,
            width,
            height,
            data,
        })
    }
}

/// Fetches and decodes one tile.
async fn fetch_tile<C: AsyncHttpClient>(
    provider: Arc<TemplateProvider<C>>,
    tile: TileIndex,
    tile_size: u32,
    timeout: Duration,
    limiter: Arc<Semaphore>,
) -> Result<(TileIndex, RgbaImage), TileFetchFailure> {
    let url = provider.build_url(&tile);
    let fail = |error: ProviderError| TileFetchFailure {
        tile,
        url: url.clone(),
        error,
    };

    let _permit = limiter
        .acquire()
        .await
        .map_err(|_| fail(ProviderError::HttpError("request limiter closed".to_string())))?;

    let data = match tokio::time::timeout(timeout, provider.download_tile(&tile)).await {
        Ok(Ok(data)) => data,
        Ok(Err(e)) => return Err(fail(e)),
        Err(_) => return Err(fail(ProviderError::Timeout(timeout))),
    };

    let tile_image = decode_tile(&data, tile_size).map_err(&fail)?;
    Ok((tile, tile_image))
}

/// Serializes the finished raster off the async workers.
async fn encode_raster(image: RgbaImage, format: OutputFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        OutputFormat::Png => tokio::task::spawn_blocking(move || encode_png(&image))
            .await
            .map_err(|e| ExportError::Internal(format!("encode task failed: {}", e)))?,
        other => Err(ExportError::UnsupportedFormat(other.to_string())),
    }
}
