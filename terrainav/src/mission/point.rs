//! Single footprint captures around a point.

use std::path::{Path, PathBuf};
use tracing::info;

use super::error::MissionResult;
use super::filename::CELL_EXTENSION;
use super::output::{capture_box, save_jpeg, SaveOutcome};
use super::params::{capture_label, AspectRatio};
use crate::coord::GeoPoint;
use crate::geometry::{box_from_center_meters, footprint_meters};
use crate::provider::{MapType, TileSource};
use crate::stitch::TileStitcher;

/// One camera position to capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCapture {
    pub center: GeoPoint,
    pub altitude_m: f64,
    pub fov_deg: f64,
    pub aspect_ratio: AspectRatio,
    pub map_type: MapType,
    pub resolution: u8,
}

impl PointCapture {
    /// `<data_dir>/<map_type>/<label>.jpg`
    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        let label = capture_label(
            self.center,
            self.altitude_m,
            self.fov_deg,
            self.aspect_ratio,
        );
        data_dir
            .join(self.map_type.name())
            .join(format!("{}.{}", label, CELL_EXTENSION))
    }
}

/// Result of a point capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOutcome {
    pub path: PathBuf,
    pub saved: SaveOutcome,
    pub failed_tiles: usize,
}

/// Stitches the footprint seen from `capture` and stores it under `data_dir`.
///
/// An image already on disk for the same point is kept and nothing is
/// fetched.
pub async fn capture_point<S: TileSource + 'static>(
    stitcher: &TileStitcher<S>,
    capture: &PointCapture,
    data_dir: &Path,
) -> MissionResult<PointOutcome> {
    let path = capture.path_in(data_dir);
    if path.exists() {
        return Ok(PointOutcome {
            path,
            saved: SaveOutcome::AlreadyPresent,
            failed_tiles: 0,
        });
    }

    let footprint = footprint_meters(
        capture.fov_deg,
        capture.altitude_m,
        capture.aspect_ratio.ratio(),
    )?;
    let bounds = box_from_center_meters(capture.center, footprint.width_m, footprint.height_m)?;
    let mosaic = capture_box(stitcher, &bounds, capture.map_type, capture.resolution).await?;
    let failed_tiles = mosaic.failures.len();

    let saved = save_jpeg(mosaic.image, &path).await?;
    info!(
        path = %path.display(),
        center = %capture.center,
        zoom = mosaic.zoom,
        failed_tiles,
        "Point captured"
    );

    Ok(PointOutcome {
        path,
        saved,
        failed_tiles,
    })
}
