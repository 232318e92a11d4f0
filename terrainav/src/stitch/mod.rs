//! Tile stitching.
//!
//! Fetches every tile covering a bounding box concurrently, pastes them onto
//! one canvas and crops the canvas to the box's exact pixel footprint.
//!
//! # Failure Handling
//!
//! Each tile retries on its own with a fixed delay between attempts. A tile
//! that exhausts its attempts is recorded in [`Mosaic::failures`] and its
//! region stays black; the rest of the mosaic is still returned.

mod canvas;
mod config;

pub use canvas::{crop_to_window, place_tile, TileWindow};
pub use config::{
    StitchConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_CONCURRENT, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RETRY_DELAY,
};

use image::RgbImage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::coord::{CoordError, GeoPoint, MAX_ZOOM};
use crate::provider::{MapType, TileSource};

/// Errors that abort a stitch before any tile is requested.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StitchError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// A tile that could not be fetched or decoded within its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tile ({tile_x}, {tile_y}) at zoom {zoom} failed after {attempts} attempts: {last_error}")]
pub struct TileFetchError {
    pub tile_x: u32,
    pub tile_y: u32,
    pub zoom: u8,
    pub attempts: u32,
    pub last_error: String,
}

/// Cropped result of one stitch.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub image: RgbImage,
    /// Zoom the tiles were fetched at
    pub zoom: u8,
    pub tiles_total: usize,
    pub failures: Vec<TileFetchError>,
}

impl Mosaic {
    pub fn tiles_fetched(&self) -> usize {
        self.tiles_total - self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when no tile at all could be fetched.
    pub fn is_fully_degraded(&self) -> bool {
        self.tiles_total > 0 && self.failures.len() == self.tiles_total
    }
}

struct FetchedTile {
    tile_x: u32,
    tile_y: u32,
    image: RgbImage,
}

/// Stitches tiles from a [`TileSource`] into cropped mosaics.
pub struct TileStitcher<S: TileSource> {
    source: Arc<S>,
    config: StitchConfig,
}

impl<S: TileSource + 'static> TileStitcher<S> {
    pub fn new(source: S, config: StitchConfig) -> Self {
        Self::with_shared_source(Arc::new(source), config)
    }

    pub fn with_shared_source(source: Arc<S>, config: StitchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Builds the mosaic for the box between `top_left` and `bottom_right`.
    ///
    /// Tiles are fetched at `min(zoom + extra_resolution, 22)`. The call
    /// returns only after every fetch task has finished, either with a tile
    /// or with its attempts exhausted.
    ///
    /// # Errors
    ///
    /// [`StitchError`] when the box is degenerate or outside the Web
    /// Mercator range; no fetch is issued in that case.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn stitch(
        &self,
        top_left: GeoPoint,
        bottom_right: GeoPoint,
        zoom: u8,
        map_type: MapType,
        extra_resolution: u8,
    ) -> Result<Mosaic, StitchError> {
        let zoom = zoom.saturating_add(extra_resolution).min(MAX_ZOOM);
        let window = TileWindow::for_bounds(top_left, bottom_right, zoom)?;

        let (width, height) = window.canvas_size();
        let mut canvas = RgbImage::new(width, height);
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent()));
        let mut fetches = JoinSet::new();
        let mut task_tiles = HashMap::new();

        for (tile_x, tile_y) in window.tiles() {
            let source = Arc::clone(&self.source);
            let limiter = Arc::clone(&limiter);
            let policy = self.config.clone();

            let handle = fetches.spawn(async move {
                fetch_with_retry(source, limiter, tile_x, tile_y, zoom, map_type, policy).await
            });
            task_tiles.insert(handle.id(), (tile_x, tile_y));
        }

        let mut failures = Vec::new();
        while let Some(joined) = fetches.join_next_with_id().await {
            match joined {
                Ok((_, Ok(tile))) => {
                    place_tile(&mut canvas, &window, tile.tile_x, tile.tile_y, &tile.image);
                }
                Ok((_, Err(failure))) => {
                    warn!(
                        tile_x = failure.tile_x,
                        tile_y = failure.tile_y,
                        zoom = failure.zoom,
                        attempts = failure.attempts,
                        error = %failure.last_error,
                        "Tile fetch exhausted, leaving gap"
                    );
                    failures.push(failure);
                }
                Err(join_err) => {
                    // Task panicked; its tile stays blank like any other failure
                    let Some((tile_x, tile_y)) = task_tiles.get(&join_err.id()).copied() else {
                        warn!(error = %join_err, "Untracked fetch task failed");
                        continue;
                    };
                    warn!(tile_x, tile_y, zoom, error = %join_err, "Tile fetch task panicked");
                    failures.push(TileFetchError {
                        tile_x,
                        tile_y,
                        zoom,
                        attempts: 0,
                        last_error: join_err.to_string(),
                    });
                }
            }
        }

        failures.sort_by_key(|f| (f.tile_y, f.tile_x));

        debug!(
            zoom,
            tiles = window.tile_count(),
            failed = failures.len(),
            crop = ?window.crop,
            "Stitch complete"
        );

        Ok(Mosaic {
            image: crop_to_window(&canvas, &window),
            zoom,
            tiles_total: window.tile_count(),
            failures,
        })
    }
}

/// Fetches and decodes one tile, retrying with a fixed delay.
///
/// A worker-pool permit is held only while a request is in flight, so
/// tiles waiting out their retry delay do not block others.
async fn fetch_with_retry<S: TileSource>(
    source: Arc<S>,
    limiter: Arc<Semaphore>,
    tile_x: u32,
    tile_y: u32,
    zoom: u8,
    map_type: MapType,
    policy: StitchConfig,
) -> Result<FetchedTile, TileFetchError> {
    let max_attempts = policy.max_attempts();
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        let outcome = {
            let Ok(_permit) = limiter.acquire().await else {
                last_error = "worker pool closed".to_string();
                break;
            };
            tokio::time::timeout(
                policy.request_timeout(),
                source.fetch_tile(tile_x, tile_y, zoom, map_type),
            )
            .await
        };

        let error = match outcome {
            Ok(Ok(bytes)) => match decode_tile(&bytes) {
                Ok(image) => {
                    return Ok(FetchedTile {
                        tile_x,
                        tile_y,
                        image,
                    })
                }
                Err(e) => e,
            },
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", policy.request_timeout()),
        };

        debug!(tile_x, tile_y, zoom, attempt, error = %error, "Tile fetch attempt failed");
        last_error = error;

        if attempt < max_attempts && policy.retry_delay() > Duration::ZERO {
            tokio::time::sleep(policy.retry_delay()).await;
        }
    }

    Err(TileFetchError {
        tile_x,
        tile_y,
        zoom,
        attempts: max_attempts,
        last_error,
    })
}

fn decode_tile(bytes: &[u8]) -> Result<RgbImage, String> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgb8())
        .map_err(|e| format!("undecodable tile: {}", e))
}
