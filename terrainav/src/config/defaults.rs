//! Default values for every configuration setting.

use std::path::PathBuf;

use super::settings::*;
use crate::coord::{BoundingBox, GeoPoint};
use crate::mission::AspectRatio;
use crate::provider::{MapType, DEFAULT_TIMEOUT_SECS};
use crate::stitch::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_CONCURRENT, DEFAULT_RETRY_DELAY};

// =============================================================================
// Mission
// =============================================================================

/// North-west corner of the default mission box (Memphis, TN).
pub const DEFAULT_TOP_LEFT: GeoPoint = GeoPoint {
    lat: 35.16,
    lon: -89.90,
};

/// South-east corner of the default mission box.
pub const DEFAULT_BOTTOM_RIGHT: GeoPoint = GeoPoint {
    lat: 35.115,
    lon: -89.823,
};

/// Flight altitude above ground in meters.
pub const DEFAULT_ALTITUDE_M: f64 = 120.0;

/// Diagonal field of view in degrees.
pub const DEFAULT_FOV_DEG: f64 = 78.8;

pub const DEFAULT_OVERLAP_PERCENT: f64 = 0.0;

/// Zoom levels added on top of the footprint zoom.
pub const DEFAULT_RESOLUTION: u8 = 2;

pub const DEFAULT_DATA_DIR: &str = "dataset/Memphis";

// =============================================================================
// Download
// =============================================================================

pub const DEFAULT_RETRY_DELAY_MS: u64 = DEFAULT_RETRY_DELAY.as_millis() as u64;

// =============================================================================
// Defaults
// =============================================================================

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            bounds: BoundingBox {
                top_left: DEFAULT_TOP_LEFT,
                bottom_right: DEFAULT_BOTTOM_RIGHT,
            },
            altitude: DEFAULT_ALTITUDE_M,
            fov: DEFAULT_FOV_DEG,
            aspect_ratio: AspectRatio::default(),
            overlap: DEFAULT_OVERLAP_PERCENT,
            map_type: MapType::default(),
            resolution: DEFAULT_RESOLUTION,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}
