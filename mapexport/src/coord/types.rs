//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted for export
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 19;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range values.
    ///
    /// Latitudes up to ±90° are accepted here; the Mercator-safe range is
    /// checked when a selection is validated for export.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a point without range checks. Only used for values produced by
    /// the inverse projection, which are in range by construction.
    pub(crate) fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees, positive north.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, positive east.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A rectangular selection given by its north-west and south-east corners.
///
/// The corners are taken as supplied by the map selection. Nothing here
/// enforces ordering; [`BoundingBox::validate`] checks that the box is
/// usable for an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north_west: GeoPoint,
    pub south_east: GeoPoint,
}

impl BoundingBox {
    pub fn new(north_west: GeoPoint, south_east: GeoPoint) -> Self {
        Self {
            north_west,
            south_east,
        }
    }

    /// Creates a box from its four edges.
    pub fn from_edges(north: f64, west: f64, south: f64, east: f64) -> Result<Self, CoordError> {
        Ok(Self {
            north_west: GeoPoint::new(north, west)?,
            south_east: GeoPoint::new(south, east)?,
        })
    }

    /// True when the west edge is numerically east of the east edge.
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.north_west.longitude > self.south_east.longitude
    }

    /// Checks that the box can be projected and exported.
    ///
    /// Rejects corners outside the Web Mercator latitude range, a north edge
    /// south of the south edge, and selections spanning the anti-meridian.
    pub fn validate(&self) -> Result<(), CoordError> {
        for corner in [self.north_west, self.south_east] {
            if !(MIN_LAT..=MAX_LAT).contains(&corner.latitude) {
                return Err(CoordError::OutsideMercatorRange(corner.latitude));
            }
        }
        if self.north_west.latitude < self.south_east.latitude {
            return Err(CoordError::InvertedLatitudes {
                north: self.north_west.latitude,
                south: self.south_east.latitude,
            });
        }
        if self.crosses_antimeridian() {
            return Err(CoordError::CrossesAntimeridian {
                west: self.north_west.longitude,
                east: self.south_east.longitude,
            });
        }
        Ok(())
    }
}

/// A slippy-map zoom level, valid in `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub fn new(zoom: u8) -> Result<Self, CoordError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(CoordError::InvalidZoom(zoom));
        }
        Ok(Self(zoom))
    }

    /// Clamps an arbitrary user value into the supported range.
    pub fn clamped(zoom: i64) -> Self {
        Self(zoom.clamp(MIN_ZOOM as i64, MAX_ZOOM as i64) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Number of tiles along each axis at this zoom (`2^zoom`).
    #[inline]
    pub fn tiles_per_axis(self) -> u32 {
        1u32 << self.0
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tile coordinates in the Web Mercator / Slippy Map system.
///
/// Produced by [`point_to_tile`](super::point_to_tile); `x` and `y` are
/// always in `[0, 2^z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    x: u32,
    y: u32,
    z: ZoomLevel,
}

impl TileIndex {
    pub(crate) fn new(x: u32, y: u32, z: ZoomLevel) -> Self {
        Self { x, y, z }
    }

    /// Column, 0 at the west edge.
    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Row, 0 at the north edge.
    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[inline]
    pub fn zoom(&self) -> ZoomLevel {
        self.z
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Inclusive rectangle of tiles covering a bounding box at one zoom level.
///
/// Always contains at least one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGrid {
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
    zoom: ZoomLevel,
}

impl TileGrid {
    /// Builds the grid spanned by two tiles, in any order.
    pub(crate) fn spanning(a: TileIndex, b: TileIndex) -> Self {
        Self {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
            zoom: a.z,
        }
    }

    pub fn min_x(&self) -> u32 {
        self.min_x
    }

    pub fn max_x(&self) -> u32 {
        self.max_x
    }

    pub fn min_y(&self) -> u32 {
        self.min_y
    }

    pub fn max_y(&self) -> u32 {
        self.max_y
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Number of tile columns.
    #[inline]
    pub fn columns(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of tile rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Total number of tiles in the grid.
    #[inline]
    pub fn tile_count(&self) -> u64 {
        self.columns() as u64 * self.rows() as u64
    }

    /// Pixel dimensions of a raster holding the whole grid.
    #[inline]
    pub fn pixel_size(&self, tile_size: u32) -> (u64, u64) {
        (
            self.columns() as u64 * tile_size as u64,
            self.rows() as u64 * tile_size as u64,
        )
    }

    /// Top-left pixel offset of `tile` inside the grid's raster.
    ///
    /// Returns `None` for tiles outside the grid.
    pub fn pixel_offset(&self, tile: &TileIndex, tile_size: u32) -> Option<(u32, u32)> {
        if !self.contains(tile) {
            return None;
        }
        Some((
            (tile.x - self.min_x) * tile_size,
            (tile.y - self.min_y) * tile_size,
        ))
    }

    pub fn contains(&self, tile: &TileIndex) -> bool {
        tile.z == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Returns an iterator over every tile in the grid.
    ///
    /// Tiles are yielded column by column (x outer, y inner).
    #[inline]
    pub fn tiles(&self) -> TileGridIterator {
        TileGridIterator {
            grid: *self,
            current: 0,
        }
    }
}

/// Iterator over all tiles in a [`TileGrid`].
#[derive(Debug, Clone)]
pub struct TileGridIterator {
    grid: TileGrid,
    current: u64,
}

impl Iterator for TileGridIterator {
    type Item = TileIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.grid.tile_count() {
            return None;
        }

        let rows = self.grid.rows() as u64;
        let x = self.grid.min_x + (self.current / rows) as u32;
        let y = self.grid.min_y + (self.current % rows) as u32;

        self.current += 1;

        Some(TileIndex::new(x, y, self.grid.zoom))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.grid.tile_count() - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileGridIterator {}

/// Errors that can occur while building coordinates and selections.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is not a finite value in [-90, 90]
    InvalidLatitude(f64),
    /// Longitude is not a finite value in [-180, 180]
    InvalidLongitude(f64),
    /// Zoom level is outside [MIN_ZOOM, MAX_ZOOM]
    InvalidZoom(u8),
    /// Latitude cannot be projected (beyond ±85.05112878)
    OutsideMercatorRange(f64),
    /// North edge lies south of the south edge
    InvertedLatitudes { north: f64, south: f64 },
    /// West edge lies east of the east edge
    CrossesAntimeridian { west: f64, east: f64 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude: {} (must be between -90 and 90)", lat)
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::OutsideMercatorRange(lat) => {
                write!(
                    f,
                    "Latitude {} is outside the Web Mercator range ({} to {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvertedLatitudes { north, south } => {
                write!(
                    f,
                    "North edge {} is south of south edge {}",
                    north, south
                )
            }
            CoordError::CrossesAntimeridian { west, east } => {
                write!(
                    f,
                    "Selection crosses the anti-meridian (west {} > east {})",
                    west, east
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
