//! Provider types and traits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use crate::coord::MAX_ZOOM;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Zoom level not supported by this provider
    UnsupportedZoom(u8),
    /// Invalid response data from provider
    InvalidResponse(String),
    /// The endpoint needs an API key and none was configured
    MissingApiKey,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by provider", zoom)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::MissingApiKey => {
                write!(f, "No API key configured for the static map service")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Map layer to request from the tile servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Satellite,
    Roadmap,
    Terrain,
}

impl MapType {
    /// Layer code used by the tile endpoint (`lyrs=`).
    pub fn layer_code(&self) -> &'static str {
        match self {
            MapType::Satellite => "s",
            MapType::Roadmap => "m",
            MapType::Terrain => "t",
        }
    }

    /// Name used by the static map endpoint and in directory names.
    pub fn name(&self) -> &'static str {
        match self {
            MapType::Satellite => "satellite",
            MapType::Roadmap => "roadmap",
            MapType::Terrain => "terrain",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "satellite" => Ok(MapType::Satellite),
            "roadmap" => Ok(MapType::Roadmap),
            "terrain" => Ok(MapType::Terrain),
            other => Err(format!(
                "unknown map type '{}' (expected satellite, roadmap or terrain)",
                other
            )),
        }
    }
}

/// Source of 256×256 map tiles addressed by Web Mercator indices.
///
/// Implementations are shared across the concurrent fetch tasks of a
/// stitch, so they must be `Send + Sync`.
pub trait TileSource: Send + Sync {
    /// Fetches one tile asynchronously.
    ///
    /// # Arguments
    ///
    /// * `tile_x` - Column, increasing eastward
    /// * `tile_y` - Row, increasing southward
    /// * `zoom` - Zoom level
    /// * `map_type` - Layer to fetch
    ///
    /// # Returns
    ///
    /// Encoded image bytes (JPEG or PNG) or an error.
    fn fetch_tile(
        &self,
        tile_x: u32,
        tile_y: u32,
        zoom: u8,
        map_type: MapType,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the source's name for logging.
    fn name(&self) -> &str;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8 {
        MAX_ZOOM
    }
}
