//! Camera footprint and bounding box geometry.
//!
//! Sizes the ground area seen by a nadir camera and places metric boxes
//! around a centre point, either along geodesics on the WGS84 ellipsoid or
//! in a UTM plane.

use geo::{GeodesicDestination, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{BoundingBox, CoordError, GeoPoint};
use crate::projection::{GeoProjector, ProjectionError};

const NORTH: f64 = 0.0;
const EAST: f64 = 90.0;
const SOUTH: f64 = 180.0;
const WEST: f64 = 270.0;

/// Errors raised by footprint and box construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Ground size of one camera image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width_m: f64,
    pub height_m: f64,
}

impl Footprint {
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }
}

/// Ground footprint of a nadir camera.
///
/// The diagonal seen at `altitude_m` is `2 * altitude * tan(fov / 2)`; it is
/// split into width and height by the angle `atan(aspect_ratio)`.
///
/// # Arguments
///
/// * `fov_deg` - Diagonal field of view in degrees, within (0, 180)
/// * `altitude_m` - Height above ground in meters, positive
/// * `aspect_ratio` - Image width divided by height, positive
pub fn footprint_meters(
    fov_deg: f64,
    altitude_m: f64,
    aspect_ratio: f64,
) -> Result<Footprint, GeometryError> {
    if !fov_deg.is_finite() || fov_deg <= 0.0 || fov_deg >= 180.0 {
        return Err(GeometryError::InvalidGeometry(format!(
            "field of view {}° must be within (0, 180)",
            fov_deg
        )));
    }
    if !altitude_m.is_finite() || altitude_m <= 0.0 {
        return Err(GeometryError::InvalidGeometry(format!(
            "altitude {} m must be positive",
            altitude_m
        )));
    }
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Err(GeometryError::InvalidGeometry(format!(
            "aspect ratio {} must be positive",
            aspect_ratio
        )));
    }

    let diagonal = 2.0 * altitude_m * (fov_deg.to_radians() / 2.0).tan();
    let angle = aspect_ratio.atan();

    Ok(Footprint {
        width_m: diagonal * angle.sin(),
        height_m: diagonal * angle.cos(),
    })
}

fn destination(from: GeoPoint, bearing: f64, distance_m: f64) -> GeoPoint {
    let to = Point::new(from.lon, from.lat).geodesic_destination(bearing, distance_m);
    GeoPoint {
        lat: to.y(),
        lon: to.x(),
    }
}

fn check_size(width_m: f64, height_m: f64) -> Result<(), GeometryError> {
    if !width_m.is_finite() || !height_m.is_finite() || width_m <= 0.0 || height_m <= 0.0 {
        return Err(GeometryError::InvalidGeometry(format!(
            "box size {} x {} m must be positive",
            width_m, height_m
        )));
    }
    Ok(())
}

/// Box of the given metric size centred on `center`, placed along geodesics.
///
/// The top-left corner is reached by travelling north half the height and
/// then west half the width; the bottom-right corner south then east.
pub fn box_from_center_meters(
    center: GeoPoint,
    width_m: f64,
    height_m: f64,
) -> Result<BoundingBox, GeometryError> {
    check_size(width_m, height_m)?;

    let north = destination(center, NORTH, height_m / 2.0);
    let top_left = destination(north, WEST, width_m / 2.0);

    let south = destination(center, SOUTH, height_m / 2.0);
    let bottom_right = destination(south, EAST, width_m / 2.0);

    Ok(BoundingBox::new(top_left, bottom_right)?)
}

/// Box of the given metric size centred on `center`, placed in the UTM plane
/// of `projector`.
pub fn box_from_center_projected(
    center: GeoPoint,
    width_m: f64,
    height_m: f64,
    projector: &GeoProjector,
) -> Result<BoundingBox, GeometryError> {
    check_size(width_m, height_m)?;

    let c = projector.to_projected(center)?;
    let top_left = projector.to_geo(c.offset(-width_m / 2.0, height_m / 2.0))?;
    let bottom_right = projector.to_geo(c.offset(width_m / 2.0, -height_m / 2.0))?;

    Ok(BoundingBox::new(top_left, bottom_right)?)
}

/// Intersection over union of two boxes, measured in degree space.
///
/// Returns 0 for disjoint boxes and 1 for identical ones.
pub fn overlap_ratio(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let west = a.top_left.lon.max(b.top_left.lon);
    let east = a.bottom_right.lon.min(b.bottom_right.lon);
    let north = a.top_left.lat.min(b.top_left.lat);
    let south = a.bottom_right.lat.max(b.bottom_right.lat);

    if east <= west || north <= south {
        return 0.0;
    }

    let intersection = (east - west) * (north - south);
    let union = a.width_deg() * a.height_deg() + b.width_deg() * b.height_deg() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}
