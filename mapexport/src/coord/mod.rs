//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates used by slippy-map tile sources.

mod types;

pub use types::{
    BoundingBox, CoordError, GeoPoint, TileGrid, TileGridIterator, TileIndex, ZoomLevel, MAX_LAT,
    MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts a geographic point to the tile containing it.
///
/// Uses the standard slippy-map projection. The result is clamped into
/// `[0, 2^zoom)`, so longitude 180 lands in the last column. Latitudes
/// outside [`MIN_LAT`]..=[`MAX_LAT`] have no meaningful tile; callers must
/// reject them first (see [`BoundingBox::validate`]).
#[inline]
pub fn point_to_tile(point: GeoPoint, zoom: ZoomLevel) -> TileIndex {
    let n = zoom.tiles_per_axis() as f64;
    let max_index = (zoom.tiles_per_axis() - 1) as i64;

    let x = (n * (point.longitude() + 180.0) / 360.0).floor();

    let lat_rad = point.latitude().to_radians();
    let mercator = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    let y = (n * (1.0 - mercator / PI) / 2.0).floor();

    TileIndex::new(
        (x as i64).clamp(0, max_index) as u32,
        (y as i64).clamp(0, max_index) as u32,
        zoom,
    )
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_point(tile: &TileIndex) -> GeoPoint {
    let n = tile.zoom().tiles_per_axis() as f64;

    let lon = tile.x() as f64 / n * 360.0 - 180.0;

    let y = tile.y() as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    GeoPoint::from_degrees(lat_rad.to_degrees(), lon)
}

/// Computes the rectangle of tiles covering a bounding box.
///
/// Both corners are projected and the per-axis min/max taken, so the grid is
/// valid whatever the corner ordering.
pub fn build_tile_grid(bounds: &BoundingBox, zoom: ZoomLevel) -> TileGrid {
    let start = point_to_tile(bounds.north_west, zoom);
    let end = point_to_tile(bounds.south_east, zoom);
    TileGrid::spanning(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn zoom(z: u8) -> ZoomLevel {
        ZoomLevel::new(z).unwrap()
    }

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = point_to_tile(point(40.7128, -74.0060), zoom(16));
        assert_eq!(tile.x(), 19295);
        assert_eq!(tile.y(), 24640);
        assert_eq!(tile.zoom().get(), 16);
    }

    #[test]
    fn test_london_at_zoom_12() {
        let tile = point_to_tile(point(51.5074, -0.1278), zoom(12));
        assert_eq!((tile.x(), tile.y()), (2046, 1362));
    }

    #[test]
    fn test_antimeridian_east_edge_maps_to_last_column() {
        let tile = point_to_tile(point(0.0, 180.0), zoom(3));
        assert_eq!(tile.x(), 7);
    }

    #[test]
    fn test_mercator_edge_stays_in_range() {
        let z = zoom(10);
        let north = point_to_tile(point(MAX_LAT, 0.0), z);
        let south = point_to_tile(point(MIN_LAT, 0.0), z);
        assert_eq!(north.y(), 0);
        assert_eq!(south.y(), z.tiles_per_axis() - 1);
    }

    #[test]
    fn test_tile_to_point_northwest_corner() {
        let tile = TileIndex::new(19295, 24640, zoom(16));
        let corner = tile_to_point(&tile);

        assert!(
            (corner.latitude() - 40.713).abs() < 0.01,
            "Latitude should be close to 40.713"
        );
        assert!(
            (corner.longitude() - (-74.007)).abs() < 0.01,
            "Longitude should be close to -74.007"
        );
    }

    #[test]
    fn test_tile_to_point_at_equator() {
        let tile = TileIndex::new(512, 512, zoom(10));
        let corner = tile_to_point(&tile);

        assert!(corner.latitude().abs() < 1e-9, "Should be on the equator");
        assert!(corner.longitude().abs() < 1e-9, "Should be on the prime meridian");
    }

    #[test]
    fn test_london_selection_grid() {
        let bounds = BoundingBox::from_edges(51.51, -0.12, 51.50, -0.10).unwrap();
        let grid = build_tile_grid(&bounds, zoom(15));

        assert_eq!((grid.min_x(), grid.max_x()), (16373, 16374));
        assert_eq!((grid.min_y(), grid.max_y()), (10895, 10897));
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.pixel_size(256), (512, 768));
    }

    #[test]
    fn test_degenerate_box_is_single_tile() {
        let p = point(48.8566, 2.3522);
        let grid = build_tile_grid(&BoundingBox::new(p, p), zoom(12));

        assert_eq!(grid.tile_count(), 1);
        assert_eq!(grid.pixel_size(256), (256, 256));
        assert_eq!(grid.tiles().count(), 1);
    }

    #[test]
    fn test_pixel_offset_is_relative_to_grid_origin() {
        let bounds = BoundingBox::from_edges(51.51, -0.12, 51.50, -0.10).unwrap();
        let grid = build_tile_grid(&bounds, zoom(15));

        let origin = TileIndex::new(16373, 10895, zoom(15));
        let right = TileIndex::new(16374, 10895, zoom(15));
        let below = TileIndex::new(16373, 10896, zoom(15));

        assert_eq!(grid.pixel_offset(&origin, 256), Some((0, 0)));
        assert_eq!(grid.pixel_offset(&right, 256), Some((256, 0)));
        assert_eq!(grid.pixel_offset(&below, 256), Some((0, 256)));
        assert_eq!(
            grid.pixel_offset(&TileIndex::new(0, 0, zoom(15)), 256),
            None
        );
    }

    #[test]
    fn test_grid_iterator_visits_every_tile_once() {
        let bounds = BoundingBox::from_edges(51.51, -0.12, 51.50, -0.10).unwrap();
        let grid = build_tile_grid(&bounds, zoom(15));

        let tiles: Vec<_> = grid.tiles().collect();
        assert_eq!(tiles.len(), 6);
        assert_eq!(grid.tiles().len(), 6);

        let unique: std::collections::HashSet<_> = tiles.iter().collect();
        assert_eq!(unique.len(), 6);
        assert!(tiles.iter().all(|t| grid.contains(t)));
    }

    #[test]
    fn test_validate_rejects_bad_selections() {
        let inverted = BoundingBox::from_edges(10.0, 0.0, 20.0, 1.0).unwrap();
        assert!(matches!(
            inverted.validate(),
            Err(CoordError::InvertedLatitudes { .. })
        ));

        let wrapped = BoundingBox::from_edges(10.0, 170.0, 5.0, -170.0).unwrap();
        assert!(wrapped.crosses_antimeridian());
        assert!(matches!(
            wrapped.validate(),
            Err(CoordError::CrossesAntimeridian { .. })
        ));

        let polar = BoundingBox::from_edges(90.0, 0.0, 80.0, 1.0).unwrap();
        assert!(matches!(
            polar.validate(),
            Err(CoordError::OutsideMercatorRange(_))
        ));

        let fine = BoundingBox::from_edges(51.51, -0.12, 51.50, -0.10).unwrap();
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(matches!(
            GeoPoint::new(91.0, 0.0),
            Err(CoordError::InvalidLatitude(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -180.5),
            Err(CoordError::InvalidLongitude(_))
        ));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_zoom_level_bounds() {
        assert!(ZoomLevel::new(0).is_err());
        assert!(ZoomLevel::new(20).is_err());
        assert_eq!(ZoomLevel::new(19).unwrap().get(), 19);
        assert_eq!(ZoomLevel::clamped(-4).get(), MIN_ZOOM);
        assert_eq!(ZoomLevel::clamped(25).get(), MAX_ZOOM);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tile_coords_in_bounds(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                z in MIN_ZOOM..=MAX_ZOOM
            ) {
                let z = zoom(z);
                let tile = point_to_tile(point(lat, lon), z);

                let max_tile = z.tiles_per_axis();
                prop_assert!(tile.x() < max_tile, "x {} exceeds {} at zoom {}", tile.x(), max_tile, z);
                prop_assert!(tile.y() < max_tile, "y {} exceeds {} at zoom {}", tile.y(), max_tile, z);
                prop_assert_eq!(tile.zoom(), z);
            }

            #[test]
            fn test_roundtrip_within_one_tile(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                z in MIN_ZOOM..=MAX_ZOOM
            ) {
                let z = zoom(z);
                let tile = point_to_tile(point(lat, lon), z);
                let corner = tile_to_point(&tile);

                // The corner is north-west of the point and within the tile's extent
                let next = tile_to_point(&TileIndex::new(tile.x() + 1, tile.y() + 1, z));
                let tile_width = next.longitude() - corner.longitude();
                let tile_height = corner.latitude() - next.latitude();

                prop_assert!(
                    (lon - corner.longitude()).abs() <= tile_width + 1e-9,
                    "Longitude roundtrip failed: {} -> {} (width {})",
                    lon, corner.longitude(), tile_width
                );
                prop_assert!(
                    (corner.latitude() - lat).abs() <= tile_height + 1e-9,
                    "Latitude roundtrip failed: {} -> {} (height {})",
                    lat, corner.latitude(), tile_height
                );
            }

            #[test]
            fn test_grid_is_corner_order_independent(
                lat_a in -85.0..85.0_f64,
                lon_a in -180.0..180.0_f64,
                lat_b in -85.0..85.0_f64,
                lon_b in -180.0..180.0_f64,
                z in MIN_ZOOM..=MAX_ZOOM
            ) {
                let z = zoom(z);
                let a = point(lat_a, lon_a);
                let b = point(lat_b, lon_b);

                let forward = build_tile_grid(&BoundingBox::new(a, b), z);
                let swapped = build_tile_grid(&BoundingBox::new(b, a), z);

                prop_assert_eq!(forward, swapped);
                prop_assert!(forward.min_x() <= forward.max_x());
                prop_assert!(forward.min_y() <= forward.max_y());
                prop_assert!(forward.tile_count() >= 1);
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                z in 10u8..=15
            ) {
                let z = zoom(z);
                let tile1 = point_to_tile(point(lat, lon1), z);
                let tile2 = point_to_tile(point(lat, lon2), z);

                prop_assert!(
                    tile1.x() < tile2.x(),
                    "Longitude not monotonic: lon {} (x {}) >= lon {} (x {})",
                    lon1, tile1.x(), lon2, tile2.x()
                );
            }

            #[test]
            fn test_tile_to_point_in_bounds(
                x_raw in 0u32..65536,
                y_raw in 0u32..65536,
                z in MIN_ZOOM..=16
            ) {
                let z = zoom(z);
                let max_coord = z.tiles_per_axis();
                let tile = TileIndex::new(x_raw % max_coord, y_raw % max_coord, z);
                let corner = tile_to_point(&tile);

                prop_assert!(
                    corner.latitude() >= MIN_LAT && corner.latitude() <= MAX_LAT + 1e-6,
                    "Latitude {} out of bounds", corner.latitude()
                );
                prop_assert!(
                    corner.longitude() >= MIN_LON && corner.longitude() < MAX_LON,
                    "Longitude {} out of bounds", corner.longitude()
                );
            }
        }
    }
}
