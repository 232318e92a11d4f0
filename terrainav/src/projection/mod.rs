//! UTM projection for metric grid math.
//!
//! Geographic WGS84 positions are converted to and from the UTM zone that
//! contains them, identified by its EPSG code (`EPSG:326NN` north,
//! `EPSG:327NN` south). Transforms run on the pure-Rust `proj4rs` engine.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::coord::GeoPoint;

const WGS84_GEOGRAPHIC: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Errors raised by zone parsing and coordinate transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("Malformed UTM EPSG code '{0}' (expected EPSG:326NN or EPSG:327NN)")]
    MalformedEpsg(String),

    #[error("Projection definition for {epsg} rejected: {reason}")]
    Definition { epsg: String, reason: String },

    #[error("Transform failed in {epsg}: {reason}")]
    Transform { epsg: String, reason: String },

    #[error("Point belongs to {found}, projector is bound to {expected}")]
    ZoneMismatch { expected: String, found: String },
}

/// A UTM zone with its hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    number: u8,
    north: bool,
}

impl UtmZone {
    /// Creates a zone, `number` must be within 1..=60.
    pub fn new(number: u8, north: bool) -> Result<Self, ProjectionError> {
        if !(1..=60).contains(&number) {
            let prefix = if north { 326 } else { 327 };
            return Err(ProjectionError::MalformedEpsg(format!(
                "EPSG:{}{:02}",
                prefix, number
            )));
        }
        Ok(Self { number, north })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    /// EPSG code of the zone, e.g. `EPSG:32616`.
    pub fn epsg(&self) -> String {
        self.to_string()
    }

    /// Central meridian of the zone in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.number as f64 * 6.0 - 183.0
    }

    fn proj_string(&self) -> String {
        let mut definition = format!(
            "+proj=utm +zone={} +datum=WGS84 +units=m +no_defs",
            self.number
        );
        if !self.north {
            definition.push_str(" +south");
        }
        definition
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.north { 326 } else { 327 };
        write!(f, "EPSG:{}{:02}", prefix, self.number)
    }
}

impl FromStr for UtmZone {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ProjectionError::MalformedEpsg(s.to_string());

        let code = s
            .strip_prefix("EPSG:")
            .or_else(|| s.strip_prefix("epsg:"))
            .ok_or_else(malformed)?;
        if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let north = match &code[..3] {
            "326" => true,
            "327" => false,
            _ => return Err(malformed()),
        };
        let number: u8 = code[3..].parse().map_err(|_| malformed())?;

        Self::new(number, north).map_err(|_| malformed())
    }
}

/// A position in meters within a specific UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
    pub zone: UtmZone,
}

impl ProjectedPoint {
    /// Returns a point shifted by `dx` east and `dy` north in the same zone.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            zone: self.zone,
        }
    }
}

/// Picks the UTM zone containing `point`.
///
/// Zone number is `floor((lon + 180) / 6) + 1`, with the antimeridian folded
/// into zone 60. Latitude zero counts as the northern hemisphere.
pub fn select_utm_zone(point: GeoPoint) -> UtmZone {
    let number = (((point.lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
    UtmZone {
        number,
        north: point.lat >= 0.0,
    }
}

/// Projects a geographic point into the zone named by `epsg`.
pub fn geo_to_projected(lat: f64, lon: f64, epsg: &str) -> Result<ProjectedPoint, ProjectionError> {
    let zone: UtmZone = epsg.parse()?;
    GeoProjector::new(zone)?.to_projected(GeoPoint { lat, lon })
}

/// Converts a projected position in the zone named by `epsg` back to geographic.
pub fn projected_to_geo(x: f64, y: f64, epsg: &str) -> Result<GeoPoint, ProjectionError> {
    let zone: UtmZone = epsg.parse()?;
    GeoProjector::new(zone)?.to_geo(ProjectedPoint { x, y, zone })
}

/// Converter bound to a single UTM zone.
///
/// Building the projection definitions is the costly part, so a mission
/// builds one projector and reuses it for every step.
pub struct GeoProjector {
    zone: UtmZone,
    geographic: Proj,
    utm: Proj,
}

impl GeoProjector {
    /// Creates a projector for `zone`.
    pub fn new(zone: UtmZone) -> Result<Self, ProjectionError> {
        let geographic = Proj::from_proj_string(WGS84_GEOGRAPHIC).map_err(|e| {
            ProjectionError::Definition {
                epsg: "EPSG:4326".to_string(),
                reason: format!("{:?}", e),
            }
        })?;
        let utm =
            Proj::from_proj_string(&zone.proj_string()).map_err(|e| ProjectionError::Definition {
                epsg: zone.epsg(),
                reason: format!("{:?}", e),
            })?;

        Ok(Self {
            zone,
            geographic,
            utm,
        })
    }

    /// Creates a projector for the zone containing `point`.
    pub fn for_point(point: GeoPoint) -> Result<Self, ProjectionError> {
        Self::new(select_utm_zone(point))
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Projects a geographic point into this projector's zone.
    pub fn to_projected(&self, point: GeoPoint) -> Result<ProjectedPoint, ProjectionError> {
        // proj4rs takes geographic input in radians
        let mut xyz = (point.lon.to_radians(), point.lat.to_radians(), 0.0);
        transform(&self.geographic, &self.utm, &mut xyz).map_err(|e| self.transform_error(e))?;

        if !xyz.0.is_finite() || !xyz.1.is_finite() {
            return Err(self.non_finite(point.lat, point.lon));
        }

        Ok(ProjectedPoint {
            x: xyz.0,
            y: xyz.1,
            zone: self.zone,
        })
    }

    /// Converts a projected point of this zone back to geographic.
    pub fn to_geo(&self, point: ProjectedPoint) -> Result<GeoPoint, ProjectionError> {
        if point.zone != self.zone {
            return Err(ProjectionError::ZoneMismatch {
                expected: self.zone.epsg(),
                found: point.zone.epsg(),
            });
        }

        let mut xyz = (point.x, point.y, 0.0);
        transform(&self.utm, &self.geographic, &mut xyz).map_err(|e| self.transform_error(e))?;

        let lat = xyz.1.to_degrees();
        let mut lon = xyz.0.to_degrees();
        if lon.is_finite() && !(-180.0..=180.0).contains(&lon) {
            lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
        }
        GeoPoint::new(lat, lon).map_err(|_| self.non_finite(point.x, point.y))
    }

    fn transform_error(&self, e: impl fmt::Debug) -> ProjectionError {
        ProjectionError::Transform {
            epsg: self.zone.epsg(),
            reason: format!("{:?}", e),
        }
    }

    fn non_finite(&self, a: f64, b: f64) -> ProjectionError {
        ProjectionError::Transform {
            epsg: self.zone.epsg(),
            reason: format!("({}, {}) has no valid image in this zone", a, b),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_round_trip_within_zone_band(
            number in 1u8..=60,
            offset in 0.0f64..5.999,
            lat in -80.0f64..84.0,
        ) {
            let zone = UtmZone::new(number, lat >= 0.0).unwrap();
            let lon = zone.central_meridian() - 3.0 + offset;
            let point = GeoPoint { lat, lon };

            let projector = GeoProjector::new(zone).unwrap();
            let projected = projector.to_projected(point).unwrap();
            let back = projector.to_geo(projected).unwrap();

            prop_assert!((back.lat - lat).abs() < 1e-6, "lat {} -> {}", lat, back.lat);
            prop_assert!((back.lon - lon).abs() < 1e-6, "lon {} -> {}", lon, back.lon);
        }

        #[test]
        fn prop_selected_zone_contains_longitude(
            lat in -80.0f64..84.0,
            lon in -180.0f64..180.0,
        ) {
            let zone = select_utm_zone(GeoPoint { lat, lon });
            prop_assert!((lon - zone.central_meridian()).abs() <= 3.0 + 1e-9);
            prop_assert_eq!(zone.is_north(), lat >= 0.0);
        }
    }
}
