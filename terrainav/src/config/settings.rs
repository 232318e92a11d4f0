//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;
use std::time::Duration;

use crate::coord::BoundingBox;
use crate::mission::{AspectRatio, MissionParams};
use crate::provider::MapType;
use crate::stitch::StitchConfig;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub mission: MissionSettings,
    pub download: DownloadSettings,
    pub provider: ProviderSettings,
}

/// Mission defaults used when the command line does not override them.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionSettings {
    pub bounds: BoundingBox,
    /// Meters above ground
    pub altitude: f64,
    /// Diagonal field of view in degrees
    pub fov: f64,
    pub aspect_ratio: AspectRatio,
    /// Percent of a footprint shared with its neighbour
    pub overlap: f64,
    pub map_type: MapType,
    pub resolution: u8,
    /// Root of the dataset output
    pub data_dir: PathBuf,
}

impl MissionSettings {
    pub fn to_params(&self) -> MissionParams {
        MissionParams {
            bounds: self.bounds,
            altitude_m: self.altitude,
            fov_deg: self.fov,
            aspect_ratio: self.aspect_ratio,
            overlap_percent: self.overlap,
            map_type: self.map_type,
            resolution: self.resolution,
        }
    }
}

/// Tile download policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Attempts per tile
    pub max_attempts: u32,
    /// Pause between attempts of the same tile
    pub retry_delay_ms: u64,
    /// Tile requests in flight at once
    pub max_concurrent: usize,
    /// HTTP timeout in seconds
    pub timeout: u64,
}

impl DownloadSettings {
    pub fn stitch_config(&self) -> StitchConfig {
        StitchConfig::new()
            .with_max_attempts(self.max_attempts)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
            .with_max_concurrent(self.max_concurrent)
            .with_request_timeout(Duration::from_secs(self.timeout))
    }
}

/// Provider credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Google Maps Static API key, needed only for static map requests
    pub google_api_key: Option<String>,
}
