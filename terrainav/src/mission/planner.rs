//! The raster walk.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::error::{MissionError, MissionResult};
use super::filename::CellName;
use super::grid::{MissionCursor, MissionGrid};
use super::layout::MissionLayout;
use super::output::{capture_box, save_jpeg, SaveOutcome};
use super::params::MissionParams;
use super::state::MissionState;
use super::summary::{MapSize, MissionSummary};
use crate::coord::{zoom_and_size_for_bounds, GeoPoint, MAX_ZOOM};
use crate::geometry::box_from_center_meters;
use crate::projection::GeoProjector;
use crate::provider::TileSource;
use crate::stitch::TileStitcher;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStatus {
    /// Every cell of the grid is on disk.
    Complete,
    /// Cancelled between cells; the next run resumes after the last one.
    Interrupted,
}

/// Tally of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionOutcome {
    pub status: MissionStatus,
    /// Cells written by this run
    pub produced: u64,
    /// Produced cells with at least one missing tile
    pub degraded: u64,
    /// Missing tiles over all produced cells
    pub failed_tiles: usize,
    /// First cell of this run, `None` if nothing was left to do
    pub started_at: Option<(u32, u32)>,
}

/// Reported after every cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellReport {
    pub col: u32,
    pub row: u32,
    pub center: GeoPoint,
    pub path: PathBuf,
    pub tiles_total: usize,
    pub tiles_failed: usize,
}

/// Result of a preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Written { path: PathBuf, failed_tiles: usize },
    AlreadyPresent(PathBuf),
}

/// Plans and runs one raster mission.
///
/// Construction sizes the grid; nothing touches the disk or the network
/// until [`run`](Self::run), [`write_log`](Self::write_log) or
/// [`write_preview`](Self::write_preview) is called.
pub struct RasterMissionPlanner<S: TileSource> {
    stitcher: TileStitcher<S>,
    params: MissionParams,
    layout: MissionLayout,
    projector: GeoProjector,
    grid: MissionGrid,
}

impl<S: TileSource + 'static> RasterMissionPlanner<S> {
    /// Sizes the mission for `params` with output under `data_dir`.
    pub fn new(
        stitcher: TileStitcher<S>,
        params: MissionParams,
        data_dir: impl AsRef<Path>,
    ) -> MissionResult<Self> {
        let projector = GeoProjector::for_point(params.bounds.center())?;
        let grid = MissionGrid::compute(&params, &projector)?;
        let layout = MissionLayout::new(data_dir, &params);

        Ok(Self {
            stitcher,
            params,
            layout,
            projector,
            grid,
        })
    }

    pub fn params(&self) -> &MissionParams {
        &self.params
    }

    pub fn grid(&self) -> &MissionGrid {
        &self.grid
    }

    pub fn layout(&self) -> &MissionLayout {
        &self.layout
    }

    /// Scans the output directory and derives where the walk continues.
    pub fn resume_cursor(&self) -> MissionResult<(Option<MissionState>, MissionCursor)> {
        let state = MissionState::scan(self.layout.raster_dir())?;
        let cursor = self.grid.resume_cursor(state.as_ref(), &self.projector)?;
        Ok((state, cursor))
    }

    /// Zoom and pixel size of the whole box as one image.
    pub fn map_size(&self) -> Option<MapSize> {
        let bounds = &self.params.bounds;
        zoom_and_size_for_bounds(bounds.top_left, bounds.bottom_right, MAX_ZOOM)
            .ok()
            .map(|(zoom, pixels)| MapSize { zoom, pixels })
    }

    /// Writes the JSON mission log for a run started at `started`.
    pub async fn write_log(&self, started: DateTime<Local>) -> MissionResult<PathBuf> {
        let on_disk = MissionState::scan(self.layout.raster_dir())?
            .map_or(0, |state| state.cells_on_disk);
        let summary =
            MissionSummary::new(started, &self.params, &self.grid, self.map_size(), on_disk);

        let path = self.layout.log_path(started);
        summary.write(&path).await?;
        info!(path = %path.display(), "Mission log written");
        Ok(path)
    }

    /// Stitches the whole box once and stores it as the mission preview.
    ///
    /// Skipped when the preview already exists.
    pub async fn write_preview(&self) -> MissionResult<PreviewOutcome> {
        let path = self.layout.preview_path().to_path_buf();
        if path.exists() {
            return Ok(PreviewOutcome::AlreadyPresent(path));
        }

        let mosaic = capture_box(
            &self.stitcher,
            &self.params.bounds,
            self.params.map_type,
            self.params.resolution,
        )
        .await?;
        let failed_tiles = mosaic.failures.len();

        match save_jpeg(mosaic.image, &path).await? {
            SaveOutcome::Written => {
                info!(path = %path.display(), failed_tiles, "Preview map written");
                Ok(PreviewOutcome::Written { path, failed_tiles })
            }
            SaveOutcome::AlreadyPresent => Ok(PreviewOutcome::AlreadyPresent(path)),
        }
    }

    /// Walks the grid from the resume cursor to the last cell.
    ///
    /// Cells are produced strictly in row-major order, one stitch at a
    /// time. `cancel` is checked before each cell; `on_cell` is called after
    /// each one is on disk.
    ///
    /// # Errors
    ///
    /// Stops at the first cell that cannot be produced. Cells written before
    /// the error stay on disk and the next run resumes after them.
    #[instrument(skip_all, fields(label = %self.params.label(), cols = self.grid.cols, rows = self.grid.rows))]
    pub async fn run<F>(
        &self,
        cancel: &CancellationToken,
        mut on_cell: F,
    ) -> MissionResult<MissionOutcome>
    where
        F: FnMut(&CellReport),
    {
        let (state, cursor) = self.resume_cursor()?;

        let mut outcome = MissionOutcome {
            status: MissionStatus::Complete,
            produced: 0,
            degraded: 0,
            failed_tiles: 0,
            started_at: None,
        };

        let MissionCursor::Next {
            mut col,
            mut row,
            mut center,
            mut position,
        } = cursor
        else {
            info!("All cells already on disk");
            return Ok(outcome);
        };

        outcome.started_at = Some((col, row));
        if let Some(state) = &state {
            info!(
                col,
                row,
                on_disk = state.cells_on_disk,
                "Resuming mission"
            );
        } else {
            info!(total = self.grid.cell_count(), "Starting mission");
        }

        let raster_dir = self.layout.raster_dir();
        tokio::fs::create_dir_all(raster_dir)
            .await
            .map_err(|e| MissionError::io(raster_dir, e))?;

        let footprint = self.grid.footprint;
        loop {
            if cancel.is_cancelled() {
                info!(col, row, produced = outcome.produced, "Mission interrupted");
                outcome.status = MissionStatus::Interrupted;
                break;
            }

            self.grid.check_bounds(col, row, position, center)?;

            let cell = box_from_center_meters(center, footprint.width_m, footprint.height_m)?;
            let mosaic = self
                .stitcher
                .stitch(
                    cell.top_left,
                    cell.bottom_right,
                    self.grid.zoom,
                    self.params.map_type,
                    self.params.resolution,
                )
                .await?;

            let tiles_total = mosaic.tiles_total;
            let tiles_failed = mosaic.failures.len();
            let path = raster_dir.join(CellName::new(col, row, center, self.grid.zoom).to_string());

            if save_jpeg(mosaic.image, &path).await? == SaveOutcome::Written {
                outcome.produced += 1;
            }
            if tiles_failed > 0 {
                warn!(col, row, tiles_failed, tiles_total, "Cell written with missing tiles");
                outcome.degraded += 1;
                outcome.failed_tiles += tiles_failed;
            }

            on_cell(&CellReport {
                col,
                row,
                center,
                path,
                tiles_total,
                tiles_failed,
            });

            match self.grid.advance(col, row, position) {
                Some((next_col, next_row, next)) => {
                    col = next_col;
                    row = next_row;
                    position = next;
                    center = self.projector.to_geo(next)?;
                }
                None => break,
            }
        }

        if outcome.status == MissionStatus::Complete {
            info!(
                produced = outcome.produced,
                degraded = outcome.degraded,
                "Mission complete"
            );
        }
        Ok(outcome)
    }
}
