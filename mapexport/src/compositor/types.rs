//! Compositor types and errors

use std::sync::Arc;

use thiserror::Error;

use super::format::OutputFormat;
use crate::config::ConfigError;
use crate::coord::{BoundingBox, TileIndex, ZoomLevel};
use crate::provider::ProviderError;
use crate::source::TileSourceConfig;

/// One region export: what to render, from where, into which format.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Selected region. `None` when nothing has been selected yet.
    pub bounds: Option<BoundingBox>,
    pub zoom: ZoomLevel,
    pub source: TileSourceConfig,
    pub format: OutputFormat,
}

impl ExportRequest {
    /// Creates a PNG export request for `bounds`.
    pub fn new(bounds: BoundingBox, zoom: ZoomLevel, source: TileSourceConfig) -> Self {
        Self {
            bounds: Some(bounds),
            zoom,
            source,
            format: OutputFormat::Png,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// A tile that could not be retrieved or decoded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("tile {tile} ({url}): {error}")]
pub struct TileFetchFailure {
    pub tile: TileIndex,
    pub url: String,
    pub error: ProviderError,
}

/// Errors that can end an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No usable region was selected
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Requested output format is recognized but not produced
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Grid exceeds the configured tile limit; nothing was fetched
    #[error("Selection needs {tiles} tiles, more than the limit of {max}")]
    GridTooLarge { tiles: u64, max: u64 },

    /// At least one tile failed; no image was produced
    #[error("{} of {} tiles failed to download", .failed.len(), .total)]
    PartialTileFailure {
        failed: Vec<TileFetchFailure>,
        total: u64,
    },

    /// Export was cancelled before it completed
    #[error("Export cancelled")]
    Cancelled,

    /// Assembled raster could not be encoded
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Export settings are unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A background task failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Tiles that failed, for [`ExportError::PartialTileFailure`].
    pub fn failed_tiles(&self) -> &[TileFetchFailure] {
        match self {
            ExportError::PartialTileFailure { failed, .. } => failed,
            _ => &[],
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Encode(e.to_string())
    }
}

/// Progress of an export, reported after each tile settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    /// Tiles placed into the raster so far
    pub loaded: u64,
    /// Tiles that failed so far
    pub failed: u64,
    /// Tiles in the grid
    pub total: u64,
}

impl ExportProgress {
    pub fn settled(&self) -> u64 {
        self.loaded + self.failed
    }
}

/// Callback invoked with each progress update.
pub type ProgressCallback = Arc<dyn Fn(ExportProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(x: u32) -> TileFetchFailure {
        TileFetchFailure {
            tile: TileIndex::new(x, 0, ZoomLevel::new(2).unwrap()),
            url: format!("http://tiles/2/{}/0.png", x),
            error: ProviderError::HttpError("connection refused".to_string()),
        }
    }

    #[test]
    fn test_partial_failure_display_counts_tiles() {
        let err = ExportError::PartialTileFailure {
            failed: vec![failure(0), failure(1)],
            total: 4,
        };
        assert_eq!(err.to_string(), "2 of 4 tiles failed to download");
        assert_eq!(err.failed_tiles().len(), 2);
    }

    #[test]
    fn test_tile_failure_display_names_tile() {
        let text = failure(3).to_string();
        assert!(text.contains("2/3/0"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_failed_tiles_empty_for_other_errors() {
        assert!(ExportError::Cancelled.failed_tiles().is_empty());
    }

    #[test]
    fn test_progress_settled() {
        let progress = ExportProgress {
            loaded: 3,
            failed: 1,
            total: 6,
        };
        assert_eq!(progress.settled(), 4);
    }
}
