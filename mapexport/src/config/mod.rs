//! Export configuration.
//!
//! [`ExportConfig`] holds the knobs of one export run; [`ConfigFile`] loads
//! them, together with extra tile sources, from an INI file.

mod file;

pub use file::{ConfigError, ConfigFile};

use std::time::Duration;

use crate::provider::DEFAULT_USER_AGENT;

/// Default edge length of a tile, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default upper bound on tiles per export (32×32 tiles, 8192×8192 pixels).
pub const DEFAULT_MAX_TILES: u64 = 1024;

/// Largest tile edge length accepted, in pixels.
pub const MAX_TILE_SIZE: u32 = 1024;

/// Largest output raster, in pixels (16384×16384, 1 GiB as RGBA).
pub const MAX_RASTER_PIXELS: u64 = 1 << 28;

/// Default per-tile request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of tile requests in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 32;

/// Configuration for tile retrieval and compositing.
///
/// # Example
///
/// ```
/// use mapexport::config::ExportConfig;
/// use std::time::Duration;
///
/// let config = ExportConfig::default();
/// assert_eq!(config.tile_size(), 256);
///
/// let config = ExportConfig::new()
///     .with_max_tiles(64)
///     .with_request_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_tiles(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    tile_size: u32,
    max_tiles: u64,
    request_timeout: Duration,
    max_concurrent: usize,
    user_agent: String,
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected tile edge length in pixels.
    ///
    /// Fetched tiles must have exactly this size. Default: 256.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the largest grid an export may request.
    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    /// Set the timeout applied to each tile request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set how many tile requests may be in flight at once.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_tiles(&self) -> u64 {
        self.max_tiles
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Largest grid an export may request at this tile size.
    ///
    /// The smaller of `max_tiles` and the number of tiles that fit in
    /// [`MAX_RASTER_PIXELS`].
    pub fn tile_limit(&self) -> u64 {
        self.max_tiles.min(raster_tile_limit(self.tile_size))
    }

    /// Rejects values an export cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid("tile_size must be positive".to_string()));
        }
        if self.tile_size > MAX_TILE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "tile_size must be at most {} pixels",
                MAX_TILE_SIZE
            )));
        }
        if self.max_tiles == 0 {
            return Err(ConfigError::Invalid("max_tiles must be positive".to_string()));
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent must be positive".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Number of `tile_size` tiles that fit in [`MAX_RASTER_PIXELS`].
pub fn raster_tile_limit(tile_size: u32) -> u64 {
    let tile_pixels = u64::from(tile_size) * u64::from(tile_size);
    MAX_RASTER_PIXELS.checked_div(tile_pixels).unwrap_or(0)
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_tiles: DEFAULT_MAX_TILES,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
