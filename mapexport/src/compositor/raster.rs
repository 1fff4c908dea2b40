//! Output raster assembly.
//!
//! The raster is sized to the whole tile grid up front. Each tile owns a
//! disjoint `tile_size`×`tile_size` region, so tiles can be placed in any
//! completion order.

use image::{imageops, RgbaImage};

use super::types::ExportError;
use crate::config::{raster_tile_limit, MAX_RASTER_PIXELS};
use crate::coord::{TileGrid, TileIndex};
use crate::provider::ProviderError;

/// Pixel buffer covering a full [`TileGrid`].
pub struct OutputRaster {
    grid: TileGrid,
    tile_size: u32,
    image: RgbaImage,
    placed: u64,
}

impl OutputRaster {
    /// Allocates a transparent raster for `grid`.
    ///
    /// Fails with [`ExportError::GridTooLarge`] when the raster would exceed
    /// [`MAX_RASTER_PIXELS`].
    pub fn new(grid: TileGrid, tile_size: u32) -> Result<Self, ExportError> {
        let (width, height) = grid.pixel_size(tile_size);
        let too_large = || ExportError::GridTooLarge {
            tiles: grid.tile_count(),
            max: raster_tile_limit(tile_size),
        };
        match width.checked_mul(height) {
            Some(pixels) if pixels <= MAX_RASTER_PIXELS => {}
            _ => return Err(too_large()),
        }
        let width = u32::try_from(width).map_err(|_| too_large())?;
        let height = u32::try_from(height).map_err(|_| too_large())?;

        Ok(Self {
            grid,
            tile_size,
            image: RgbaImage::new(width, height),
            placed: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of tiles placed so far.
    pub fn placed(&self) -> u64 {
        self.placed
    }

    /// True once every tile of the grid has been placed.
    pub fn is_complete(&self) -> bool {
        self.placed == self.grid.tile_count()
    }

    /// Copies `tile_image` into the region owned by `tile`, unscaled.
    ///
    /// Returns the pixel offset the tile was written at.
    pub fn place(&mut self, tile: &TileIndex, tile_image: &RgbaImage) -> Result<(u32, u32), ExportError> {
        if tile_image.dimensions() != (self.tile_size, self.tile_size) {
            return Err(ExportError::Internal(format!(
                "tile {} is {}×{}, expected {}×{}",
                tile,
                tile_image.width(),
                tile_image.height(),
                self.tile_size,
                self.tile_size
            )));
        }
        let (x, y) = self.grid.pixel_offset(tile, self.tile_size).ok_or_else(|| {
            ExportError::Internal(format!("tile {} is outside the export grid", tile))
        })?;

        imageops::replace(&mut self.image, tile_image, x as i64, y as i64);
        self.placed += 1;
        Ok((x, y))
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Decodes a fetched tile and checks it has the expected size.
pub(crate) fn decode_tile(data: &[u8], tile_size: u32) -> Result<RgbaImage, ProviderError> {
    let image = image::load_from_memory(data)
        .map_err(|e| ProviderError::InvalidResponse(format!("image decode error: {}", e)))?
        .to_rgba8();

    if image.dimensions() != (tile_size, tile_size) {
        return Err(ProviderError::InvalidResponse(format!(
            "tile is {}×{}, expected {}×{}",
            image.width(),
            image.height(),
            tile_size,
            tile_size
        )));
    }
    Ok(image)
}
