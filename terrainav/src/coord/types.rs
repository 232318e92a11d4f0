//! Core geographic and tile types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Highest zoom level served by the tile servers.
pub const MAX_ZOOM: u8 = 22;

/// Edge length of a tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Largest image edge the static map service returns, before any resolution bonus.
pub const MAX_IMAGE_SIZE: u32 = 640;

/// Errors raised by coordinate and tile math.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be within the valid range)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Invalid zoom level: {0} (must be between {MIN_ZOOM} and {MAX_ZOOM})")]
    InvalidZoom(u8),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The box is too small to render within the zoom range of the service.
    #[error("Required zoom {zoom} exceeds maximum zoom {max_zoom}")]
    OutOfBounds { zoom: i32, max_zoom: u8 },
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lon)
    }
}

/// A north-up box given by its north-west and south-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

impl BoundingBox {
    /// Creates a box, rejecting inverted or dateline-crossing corners.
    ///
    /// Zero-width or zero-height boxes are accepted here; callers that need
    /// area check [`BoundingBox::has_area`].
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Result<Self, CoordError> {
        if top_left.lat < bottom_right.lat {
            return Err(CoordError::InvalidGeometry(format!(
                "top-left latitude {} is south of bottom-right latitude {}",
                top_left.lat, bottom_right.lat
            )));
        }
        if top_left.lon > bottom_right.lon {
            return Err(CoordError::InvalidGeometry(format!(
                "top-left longitude {} is east of bottom-right longitude {}",
                top_left.lon, bottom_right.lon
            )));
        }
        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    /// Geographic centre of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.top_left.lat + self.bottom_right.lat) / 2.0,
            lon: (self.top_left.lon + self.bottom_right.lon) / 2.0,
        }
    }

    pub fn has_area(&self) -> bool {
        self.top_left.lat > self.bottom_right.lat && self.top_left.lon < self.bottom_right.lon
    }

    pub fn width_deg(&self) -> f64 {
        self.bottom_right.lon - self.top_left.lon
    }

    pub fn height_deg(&self) -> f64 {
        self.top_left.lat - self.bottom_right.lat
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.top_left, self.bottom_right)
    }
}

/// Tile address of a point plus its pixel offset inside that tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// Column, increases eastward
    pub tile_x: u32,
    /// Row, increases southward
    pub tile_y: u32,
    pub zoom: u8,
    /// Pixel offset within the tile (0-255)
    pub pixel_x: u32,
    /// Pixel offset within the tile (0-255)
    pub pixel_y: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(matches!(
            GeoPoint::new(90.5, 0.0),
            Err(CoordError::InvalidLatitude(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -180.1),
            Err(CoordError::InvalidLongitude(_))
        ));
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_bounding_box_rejects_inverted_corners() {
        let result = BoundingBox::new(point(35.0, -89.0), point(35.1, -88.0));
        assert!(matches!(result, Err(CoordError::InvalidGeometry(_))));

        let result = BoundingBox::new(point(35.1, -88.0), point(35.0, -89.0));
        assert!(matches!(result, Err(CoordError::InvalidGeometry(_))));
    }

    #[test]
    fn test_bounding_box_center_and_extent() {
        let bbox = BoundingBox::new(point(35.16, -89.90), point(35.115, -89.823)).unwrap();
        let center = bbox.center();
        assert!((center.lat - 35.1375).abs() < 1e-9);
        assert!((center.lon - -89.8615).abs() < 1e-9);
        assert!((bbox.width_deg() - 0.077).abs() < 1e-9);
        assert!((bbox.height_deg() - 0.045).abs() < 1e-9);
        assert!(bbox.has_area());
    }

    #[test]
    fn test_degenerate_box_has_no_area() {
        let bbox = BoundingBox::new(point(35.0, -89.0), point(35.0, -88.0)).unwrap();
        assert!(!bbox.has_area());
    }
}
