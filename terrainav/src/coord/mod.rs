//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and the Web Mercator tile and pixel space used by map tile servers, plus
//! zoom selection for fitting a bounding box into a single image.

mod types;

pub use types::{
    BoundingBox, CoordError, GeoPoint, TileIndex, MAX_IMAGE_SIZE, MAX_LAT, MAX_LON, MAX_ZOOM,
    MIN_LAT, MIN_LON, MIN_ZOOM, TILE_SIZE,
};

use std::f64::consts::PI;

/// Width of the zoom-0 world in pixels.
const WORLD_SIZE: f64 = TILE_SIZE as f64;

/// Centre of the zoom-0 world in pixels.
const WORLD_CENTER: f64 = WORLD_SIZE / 2.0;

const PIXELS_PER_DEGREE: f64 = WORLD_SIZE / 360.0;

const PIXELS_PER_RADIAN: f64 = WORLD_SIZE / (2.0 * PI);

/// Keeps the Mercator y finite at the poles.
const SIN_LAT_LIMIT: f64 = 1.0 - 1e-15;

/// Projects a point to Mercator world pixels at zoom 0.
///
/// Multiply by `2^zoom` to get pixel coordinates at another zoom level.
pub fn world_pixel(point: GeoPoint) -> (f64, f64) {
    let x = WORLD_CENTER + point.lon * PIXELS_PER_DEGREE;

    let sin_lat = point
        .lat
        .to_radians()
        .sin()
        .clamp(-SIN_LAT_LIMIT, SIN_LAT_LIMIT);
    let y = WORLD_CENTER + 0.5 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() * -PIXELS_PER_RADIAN;

    (x, y)
}

/// Inverse of [`world_pixel`].
pub fn world_pixel_to_geo(x: f64, y: f64) -> GeoPoint {
    let lon = (x - WORLD_CENTER) / PIXELS_PER_DEGREE;
    let lat_rad = 2.0 * ((y - WORLD_CENTER) / -PIXELS_PER_RADIAN).exp().atan() - PI / 2.0;
    GeoPoint {
        lat: lat_rad.to_degrees(),
        lon,
    }
}

/// Chooses the largest zoom at which a box fits into a single image.
///
/// Both corners are projected to world pixels; with half the pixel span
/// per axis, the full extent at zoom `z` is `half * 2^(z+1)`. The returned
/// zoom is the largest one keeping that extent within [`MAX_IMAGE_SIZE`] on
/// both axes, together with the resulting pixel width and height.
///
/// # Errors
///
/// * [`CoordError::InvalidGeometry`] if the box has no extent, or cannot
///   fit even at zoom 0
/// * [`CoordError::OutOfBounds`] if the fitting zoom exceeds `max_zoom`
pub fn zoom_and_size_for_bounds(
    top_left: GeoPoint,
    bottom_right: GeoPoint,
    max_zoom: u8,
) -> Result<(u8, [u32; 2]), CoordError> {
    let (tl_x, tl_y) = world_pixel(top_left);
    let (br_x, br_y) = world_pixel(bottom_right);

    let half_x = (br_x - tl_x) / 2.0;
    let half_y = (br_y - tl_y) / 2.0;
    let half_max = half_x.max(half_y);

    if !half_max.is_finite() || half_max <= 0.0 || half_x < 0.0 || half_y < 0.0 {
        return Err(CoordError::InvalidGeometry(format!(
            "box {} -> {} has no positive pixel extent",
            top_left, bottom_right
        )));
    }

    let zoom = (-(half_max / MAX_IMAGE_SIZE as f64).log2() - 1.0).floor() as i32;
    if zoom < 0 {
        return Err(CoordError::InvalidGeometry(format!(
            "box {} -> {} is larger than a single image at zoom 0",
            top_left, bottom_right
        )));
    }
    if zoom > max_zoom as i32 {
        return Err(CoordError::OutOfBounds { zoom, max_zoom });
    }

    let scale = 2.0_f64.powi(zoom + 1);
    let width = (half_x * scale) as u32;
    let height = (half_y * scale) as u32;

    Ok((zoom as u8, [width, height]))
}

/// Converts a geographic point to its tile index and in-tile pixel offset.
///
/// # Arguments
///
/// * `point` - Position; latitude must be within the Web Mercator range
/// * `zoom` - Zoom level (0 to 22)
#[inline]
pub fn tile_index_for(point: GeoPoint, zoom: u8) -> Result<TileIndex, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
        return Err(CoordError::InvalidLatitude(point.lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&point.lon) {
        return Err(CoordError::InvalidLongitude(point.lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let last = (1u32 << zoom) - 1;

    let x = (point.lon + 180.0) / 360.0 * n;
    let lat_rad = point.lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    let tile_x = (x.floor() as u32).min(last);
    let tile_y = (y.floor().max(0.0) as u32).min(last);

    let pixel_x = (((x - tile_x as f64) * WORLD_SIZE) as u32).min(TILE_SIZE - 1);
    let pixel_y = (((y - tile_y as f64) * WORLD_SIZE).max(0.0) as u32).min(TILE_SIZE - 1);

    Ok(TileIndex {
        tile_x,
        tile_y,
        zoom,
        pixel_x,
        pixel_y,
    })
}

/// Returns the latitude/longitude of a tile's north-west corner.
#[inline]
pub fn tile_origin(tile_x: u32, tile_y: u32, zoom: u8) -> GeoPoint {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = tile_x as f64 / n * 360.0 - 180.0;

    let y = tile_y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    GeoPoint {
        lat: lat_rad.to_degrees(),
        lon,
    }
}

/// Geographic box covered by a static map image centred on `center`.
pub fn static_map_bounds(
    center: GeoPoint,
    zoom: u8,
    size: [u32; 2],
) -> Result<BoundingBox, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    if size[0] == 0 || size[1] == 0 {
        return Err(CoordError::InvalidGeometry(format!(
            "static map size {}x{} is empty",
            size[0], size[1]
        )));
    }

    let scale = 2.0_f64.powi(zoom as i32);
    let (cx, cy) = world_pixel(center);
    let half_w = size[0] as f64 / 2.0 / scale;
    let half_h = size[1] as f64 / 2.0 / scale;

    let top_left = world_pixel_to_geo(cx - half_w, cy - half_h);
    let bottom_right = world_pixel_to_geo(cx + half_w, cy + half_h);

    BoundingBox::new(top_left, bottom_right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let index = tile_index_for(point(40.7128, -74.0060), 16).unwrap();
        assert_eq!(index.tile_y, 24640);
        assert_eq!(index.tile_x, 19295);
        assert_eq!(index.zoom, 16);
        assert!(index.pixel_x < TILE_SIZE);
        assert!(index.pixel_y < TILE_SIZE);
    }

    #[test]
    fn test_origin_is_tile_corner() {
        let index = tile_index_for(point(0.0, 0.0), 1).unwrap();
        assert_eq!((index.tile_x, index.tile_y), (1, 1));
        assert_eq!((index.pixel_x, index.pixel_y), (0, 0));
    }

    #[test]
    fn test_antimeridian_clamps_to_last_tile() {
        let index = tile_index_for(point(0.0, 180.0), 3).unwrap();
        assert_eq!(index.tile_x, 7);
        assert_eq!(index.pixel_x, TILE_SIZE - 1);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = tile_index_for(GeoPoint { lat: 86.0, lon: 0.0 }, 10);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = tile_index_for(point(10.0, 10.0), 23);
        assert!(matches!(result, Err(CoordError::InvalidZoom(23))));
    }

    #[test]
    fn test_world_pixel_round_trip() {
        let p = point(35.1375, -89.8615);
        let (x, y) = world_pixel(p);
        let back = world_pixel_to_geo(x, y);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lon - p.lon).abs() < 1e-9);
    }

    #[test]
    fn test_tile_origin_contains_point() {
        let p = point(35.16, -89.90);
        let index = tile_index_for(p, 18).unwrap();
        let origin = tile_origin(index.tile_x, index.tile_y, 18);
        assert!(origin.lat >= p.lat);
        assert!(origin.lon <= p.lon);
    }

    #[test]
    fn test_zoom_for_memphis_area() {
        let (zoom, [w, h]) =
            zoom_and_size_for_bounds(point(35.16, -89.90), point(35.115, -89.823), MAX_ZOOM)
                .unwrap();
        // 0.077° of longitude spans ~448 px at zoom 13
        assert_eq!(zoom, 13);
        assert!(w <= MAX_IMAGE_SIZE && h <= MAX_IMAGE_SIZE);
        assert!(w > MAX_IMAGE_SIZE / 2);
        assert!(w > h);
    }

    #[test]
    fn test_zoom_rejects_degenerate_box() {
        let p = point(35.16, -89.90);
        let result = zoom_and_size_for_bounds(p, p, MAX_ZOOM);
        assert!(matches!(result, Err(CoordError::InvalidGeometry(_))));
    }

    #[test]
    fn test_zoom_rejects_inverted_box() {
        let result = zoom_and_size_for_bounds(point(35.0, -89.0), point(35.1, -89.1), MAX_ZOOM);
        assert!(matches!(result, Err(CoordError::InvalidGeometry(_))));
    }

    #[test]
    fn test_zoom_out_of_bounds_for_tiny_box() {
        let result = zoom_and_size_for_bounds(
            point(35.0, -89.0),
            point(35.0 - 1e-7, -89.0 + 1e-7),
            MAX_ZOOM,
        );
        assert!(matches!(result, Err(CoordError::OutOfBounds { .. })));
    }

    #[test]
    fn test_zoom_respects_custom_max() {
        let result =
            zoom_and_size_for_bounds(point(35.16, -89.90), point(35.115, -89.823), 10);
        assert!(matches!(
            result,
            Err(CoordError::OutOfBounds {
                zoom: 13,
                max_zoom: 10
            })
        ));
    }

    #[test]
    fn test_static_map_bounds_is_centred() {
        let center = point(35.1375, -89.8615);
        let bbox = static_map_bounds(center, 15, [640, 640]).unwrap();
        assert!(bbox.has_area());
        assert!((bbox.center().lon - center.lon).abs() < 1e-9);
        // Mercator stretches northward, so the latitude centre is only approximate
        assert!((bbox.center().lat - center.lat).abs() < 1e-4);
    }

    #[test]
    fn test_static_map_bounds_fits_back_into_same_zoom() {
        let center = point(35.1375, -89.8615);
        let bbox = static_map_bounds(center, 15, [600, 400]).unwrap();
        let (zoom, [w, h]) =
            zoom_and_size_for_bounds(bbox.top_left, bbox.bottom_right, MAX_ZOOM).unwrap();
        assert_eq!(zoom, 15);
        assert!((599..=600).contains(&w));
        assert!((399..=400).contains(&h));
    }
}
