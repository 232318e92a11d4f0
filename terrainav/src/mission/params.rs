//! Mission parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{MissionError, MissionResult};
use crate::coord::{BoundingBox, GeoPoint, MAX_ZOOM};
use crate::geometry::{footprint_meters, Footprint};
use crate::provider::MapType;

/// Camera aspect ratio as width and height, e.g. 4:3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::new(4.0, 3.0)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    /// Parses `W:H`, `WxH` or `W H`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ':' || c == 'x' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 2 {
            return Err(format!("'{}' is not an aspect ratio like 4:3", s));
        }
        let width: f64 = parts[0]
            .parse()
            .map_err(|_| format!("invalid aspect width '{}'", parts[0]))?;
        let height: f64 = parts[1]
            .parse()
            .map_err(|_| format!("invalid aspect height '{}'", parts[1]))?;
        let ratio = Self::new(width, height);
        if !ratio.is_valid() {
            return Err(format!("aspect ratio '{}' must be positive", s));
        }
        Ok(ratio)
    }
}

/// Everything that fixes a raster mission.
///
/// Two runs with equal parameters produce the same grid and the same file
/// names, which is what makes a mission resumable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionParams {
    pub bounds: BoundingBox,
    pub altitude_m: f64,
    /// Diagonal field of view in degrees
    pub fov_deg: f64,
    pub aspect_ratio: AspectRatio,
    /// Share of a footprint covered by its neighbour, in percent
    pub overlap_percent: f64,
    pub map_type: MapType,
    /// Zoom levels added on top of the footprint zoom when stitching
    pub resolution: u8,
}

impl MissionParams {
    /// Checks the parameters and returns the footprint of one cell.
    pub fn validate(&self) -> MissionResult<Footprint> {
        if !self.bounds.has_area() {
            return Err(MissionError::InvalidGeometry(format!(
                "bounding box {} has no area",
                self.bounds
            )));
        }
        if !self.overlap_percent.is_finite() || !(0.0..100.0).contains(&self.overlap_percent) {
            return Err(MissionError::InvalidGeometry(format!(
                "overlap {}% must be within [0, 100)",
                self.overlap_percent
            )));
        }
        if !self.aspect_ratio.is_valid() {
            return Err(MissionError::InvalidGeometry(format!(
                "aspect ratio {} must be positive",
                self.aspect_ratio
            )));
        }
        if self.resolution > MAX_ZOOM {
            return Err(MissionError::InvalidGeometry(format!(
                "resolution bonus {} exceeds zoom {}",
                self.resolution, MAX_ZOOM
            )));
        }

        Ok(footprint_meters(
            self.fov_deg,
            self.altitude_m,
            self.aspect_ratio.ratio(),
        )?)
    }

    /// Overlap as a fraction in [0, 1).
    pub fn overlap_fraction(&self) -> f64 {
        self.overlap_percent / 100.0
    }

    /// Identifies the mission in directory and preview names.
    ///
    /// `<centerLat>_<centerLon>_<altitude>_<fov>_<aspectW>_<aspectH>`
    pub fn label(&self) -> String {
        capture_label(
            self.bounds.center(),
            self.altitude_m,
            self.fov_deg,
            self.aspect_ratio,
        )
    }
}

/// Name stem for an image of the footprint around `center`.
pub fn capture_label(
    center: GeoPoint,
    altitude_m: f64,
    fov_deg: f64,
    aspect_ratio: AspectRatio,
) -> String {
    format!(
        "{:.7}_{:.7}_{}_{}_{}_{}",
        center.lat, center.lon, altitude_m, fov_deg, aspect_ratio.width, aspect_ratio.height
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn memphis() -> MissionParams {
        MissionParams {
            bounds: BoundingBox::new(
                GeoPoint::new(35.16, -89.90).unwrap(),
                GeoPoint::new(35.115, -89.823).unwrap(),
            )
            .unwrap(),
            altitude_m: 120.0,
            fov_deg: 78.8,
            aspect_ratio: AspectRatio::default(),
            overlap_percent: 0.0,
            map_type: MapType::Satellite,
            resolution: 2,
        }
    }

    #[test]
    fn test_aspect_ratio_parsing() {
        assert_eq!("4:3".parse::<AspectRatio>().unwrap(), AspectRatio::new(4.0, 3.0));
        assert_eq!("16x9".parse::<AspectRatio>().unwrap(), AspectRatio::new(16.0, 9.0));
        assert_eq!("3 2".parse::<AspectRatio>().unwrap(), AspectRatio::new(3.0, 2.0));
        assert!("4".parse::<AspectRatio>().is_err());
        assert!("4:0".parse::<AspectRatio>().is_err());
        assert!("a:b".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_validate_returns_footprint() {
        let footprint = memphis().validate().unwrap();
        assert!((footprint.width_m - 157.7).abs() < 0.5);
        assert!((footprint.height_m - 118.3).abs() < 0.5);
    }

    #[test]
    fn test_overlap_must_stay_below_hundred() {
        let mut params = memphis();
        params.overlap_percent = 100.0;
        assert!(matches!(
            params.validate(),
            Err(MissionError::InvalidGeometry(_))
        ));
        params.overlap_percent = -1.0;
        assert!(params.validate().is_err());
        params.overlap_percent = 30.0;
        assert!(params.validate().is_ok());
        assert!((params.overlap_fraction() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_bad_camera_is_geometry_error() {
        let mut params = memphis();
        params.altitude_m = 0.0;
        assert!(matches!(params.validate(), Err(MissionError::Geometry(_))));
    }

    #[test]
    fn test_degenerate_box_is_rejected() {
        let mut params = memphis();
        params.bounds.bottom_right.lon = params.bounds.top_left.lon;
        assert!(matches!(
            params.validate(),
            Err(MissionError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_label() {
        assert_eq!(
            memphis().label(),
            "35.1375000_-89.8615000_120_78.8_4_3"
        );
    }
}
