//! Serialization of `ConfigFile` to the commented INI written to disk.

use super::settings::ConfigFile;

/// Converts a `ConfigFile` to a commented INI string.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mission = &config.mission;
    let download = &config.download;
    let google_api_key = config.provider.google_api_key.as_deref().unwrap_or("");

    format!(
        r#"[mission]
; Mission bounding box corners as "lat,lon"
top_left = {},{}
bottom_right = {},{}
; Flight altitude above ground in meters
altitude = {}
; Diagonal camera field of view in degrees
fov = {}
; Image aspect ratio as width:height
aspect_ratio = {}:{}
; Percent of a footprint shared with its neighbours, 0 to below 100
overlap = {}
; Imagery layer: satellite, roadmap or terrain
map_type = {}
; Zoom levels added on top of the footprint zoom (higher = sharper, more tiles)
resolution = {}
; Root directory of the dataset
data_dir = {}

[download]
; Attempts per tile before it is left blank
max_attempts = {}
; Pause between attempts of the same tile, in milliseconds
retry_delay_ms = {}
; Tile requests in flight at once
max_concurrent = {}
; HTTP timeout in seconds
timeout = {}

[provider]
; Google Maps Static API key, only needed for static-map
google_api_key = {}
"#,
        mission.bounds.top_left.lat,
        mission.bounds.top_left.lon,
        mission.bounds.bottom_right.lat,
        mission.bounds.bottom_right.lon,
        mission.altitude,
        mission.fov,
        mission.aspect_ratio.width,
        mission.aspect_ratio.height,
        mission.overlap,
        mission.map_type,
        mission.resolution,
        mission.data_dir.to_string_lossy(),
        download.max_attempts,
        download.retry_delay_ms,
        download.max_concurrent,
        download.timeout,
        google_api_key,
    )
}
