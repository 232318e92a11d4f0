//! Raster grid sizing and the resume cursor.

use serde::Serialize;
use tracing::debug;

use super::error::{MissionError, MissionResult};
use super::params::MissionParams;
use super::state::MissionState;
use crate::coord::{zoom_and_size_for_bounds, GeoPoint, MAX_ZOOM};
use crate::geometry::{box_from_center_projected, Footprint};
use crate::projection::{GeoProjector, ProjectedPoint, ProjectionError, UtmZone};

/// Longitude and latitude span whose projected length bounds walk drift.
const DRIFT_TOLERANCE_DEG: f64 = 0.02;

/// The raster laid over a mission box, derived once from its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionGrid {
    pub cols: u32,
    pub rows: u32,
    pub footprint: Footprint,
    /// Zoom at which one footprint fits a single 640 px image
    pub zoom: u8,
    /// Pixel size of one footprint at `zoom`
    pub image_size_px: [u32; 2],
    pub zone: UtmZone,
    pub origin: GeoPoint,
    pub limit: GeoPoint,
    pub top_left: ProjectedPoint,
    pub bottom_right: ProjectedPoint,
    pub width_m: f64,
    pub height_m: f64,
    pub step_x_m: f64,
    pub step_y_m: f64,
    pub tolerance_x_m: f64,
    pub tolerance_y_m: f64,
}

/// Where the walk continues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionCursor {
    /// Every cell is on disk.
    Complete,
    /// Next cell to produce.
    Next {
        col: u32,
        row: u32,
        center: GeoPoint,
        position: ProjectedPoint,
    },
}

impl MissionGrid {
    /// Sizes the grid for `params` in the zone of `projector`.
    ///
    /// The projector should be the one for the zone of the box centre; the
    /// planner builds it with [`GeoProjector::for_point`].
    pub fn compute(params: &MissionParams, projector: &GeoProjector) -> MissionResult<Self> {
        let footprint = params.validate()?;
        let overlap = params.overlap_fraction();

        let origin = params.bounds.top_left;
        let limit = params.bounds.bottom_right;
        let top_left = projector.to_projected(origin)?;
        let bottom_right = projector.to_projected(limit)?;

        let width_m = (bottom_right.x - top_left.x).abs();
        let height_m = (top_left.y - bottom_right.y).abs();
        let step_x_m = footprint.width_m * (1.0 - overlap);
        let step_y_m = footprint.height_m * (1.0 - overlap);

        let cols = cell_count(width_m, step_x_m)?;
        let rows = cell_count(height_m, step_y_m)?;

        let sample =
            box_from_center_projected(origin, footprint.width_m, footprint.height_m, projector)?;
        let (zoom, image_size_px) =
            zoom_and_size_for_bounds(sample.top_left, sample.bottom_right, MAX_ZOOM)?;

        let east = projector.to_projected(GeoPoint {
            lat: limit.lat,
            lon: limit.lon + DRIFT_TOLERANCE_DEG,
        })?;
        let south = projector.to_projected(GeoPoint {
            lat: limit.lat - DRIFT_TOLERANCE_DEG,
            lon: limit.lon,
        })?;

        let grid = Self {
            cols,
            rows,
            footprint,
            zoom,
            image_size_px,
            zone: projector.zone(),
            origin,
            limit,
            top_left,
            bottom_right,
            width_m,
            height_m,
            step_x_m,
            step_y_m,
            tolerance_x_m: (east.x - bottom_right.x).abs(),
            tolerance_y_m: (bottom_right.y - south.y).abs(),
        };

        debug!(
            cols,
            rows,
            zoom,
            zone = %grid.zone,
            step_x_m,
            step_y_m,
            "Computed mission grid"
        );
        Ok(grid)
    }

    pub fn cell_count(&self) -> u64 {
        self.cols as u64 * self.rows as u64
    }

    /// Cells still to produce from `cursor` on.
    pub fn remaining(&self, cursor: &MissionCursor) -> u64 {
        match cursor {
            MissionCursor::Complete => 0,
            MissionCursor::Next { col, row, .. } => {
                self.cell_count() - (*row as u64 * self.cols as u64 + *col as u64)
            }
        }
    }

    /// Area covered by the mission box in square meters.
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }

    /// Position of the cell following `(col, row)` in row-major order.
    ///
    /// Steps east within a row; at the row end steps south and returns to
    /// the box's left edge. `None` after the last cell.
    pub fn advance(
        &self,
        col: u32,
        row: u32,
        position: ProjectedPoint,
    ) -> Option<(u32, u32, ProjectedPoint)> {
        if col + 1 < self.cols {
            Some((col + 1, row, position.offset(self.step_x_m, 0.0)))
        } else if row + 1 < self.rows {
            let next = ProjectedPoint {
                x: self.top_left.x,
                y: position.y - self.step_y_m,
                zone: position.zone,
            };
            Some((0, row + 1, next))
        } else {
            None
        }
    }

    /// Derives the next cell from what is already on disk.
    ///
    /// Without state the walk starts at (0, 0) centred on the box's
    /// top-left corner. Otherwise it continues after the last completed
    /// cell, whose centre is re-projected from its file name.
    pub fn resume_cursor(
        &self,
        state: Option<&MissionState>,
        projector: &GeoProjector,
    ) -> MissionResult<MissionCursor> {
        if projector.zone() != self.zone {
            return Err(ProjectionError::ZoneMismatch {
                expected: self.zone.epsg(),
                found: projector.zone().epsg(),
            }
            .into());
        }

        let Some(state) = state else {
            return Ok(MissionCursor::Next {
                col: 0,
                row: 0,
                center: self.origin,
                position: self.top_left,
            });
        };

        let last = state.last;
        if last.col >= self.cols || last.row >= self.rows {
            return Err(MissionError::GridMismatch(format!(
                "cell ({}, {}) on disk is outside the {}x{} grid",
                last.col, last.row, self.cols, self.rows
            )));
        }
        if last.zoom != self.zoom {
            return Err(MissionError::GridMismatch(format!(
                "cells on disk were taken at zoom {}, grid zoom is {}",
                last.zoom, self.zoom
            )));
        }

        let position = projector.to_projected(last.center())?;
        match self.advance(last.col, last.row, position) {
            None => Ok(MissionCursor::Complete),
            Some((col, row, position)) => Ok(MissionCursor::Next {
                col,
                row,
                center: projector.to_geo(position)?,
                position,
            }),
        }
    }

    /// Fails when `position` has drifted past the bottom-right corner by
    /// more than one cell plus the tolerance.
    pub fn check_bounds(
        &self,
        col: u32,
        row: u32,
        position: ProjectedPoint,
        center: GeoPoint,
    ) -> MissionResult<()> {
        let past_east = position.x > self.bottom_right.x + self.footprint.width_m + self.tolerance_x_m;
        let past_south =
            position.y < self.bottom_right.y - self.footprint.height_m - self.tolerance_y_m;

        if past_east || past_south {
            return Err(MissionError::OutOfBounds {
                position: center,
                col,
                row,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

fn cell_count(extent_m: f64, step_m: f64) -> MissionResult<u32> {
    let count = (extent_m / step_m).floor();
    if !count.is_finite() || count < 1.0 {
        return Err(MissionError::InvalidGeometry(format!(
            "{:.1} m cannot hold one {:.1} m step",
            extent_m, step_m
        )));
    }
    if count > u32::MAX as f64 {
        return Err(MissionError::InvalidGeometry(format!(
            "{:.1} m holds too many {:.1} m steps",
            extent_m, step_m
        )));
    }
    Ok(count as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::BoundingBox;
    use crate::mission::filename::CellName;
    use crate::mission::params::tests::memphis;

    fn projector_for(params: &MissionParams) -> GeoProjector {
        GeoProjector::for_point(params.bounds.center()).unwrap()
    }

    fn state_at(grid: &MissionGrid, col: u32, row: u32, projector: &GeoProjector) -> MissionState {
        let position = grid
            .top_left
            .offset(col as f64 * grid.step_x_m, -(row as f64) * grid.step_y_m);
        let center = projector.to_geo(position).unwrap();
        MissionState {
            last: CellName::new(col, row, center, grid.zoom),
            cells_on_disk: 1,
        }
    }

    #[test]
    fn test_memphis_grid() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();

        assert_eq!(grid.zone.epsg(), "EPSG:32616");
        // ~6.9 km by ~5.2 km over a 157.7 m by 118.3 m footprint
        assert!((6_800.0..6_950.0).contains(&grid.width_m), "{}", grid.width_m);
        assert!((5_120.0..5_270.0).contains(&grid.height_m), "{}", grid.height_m);
        assert_eq!(grid.cols, (grid.width_m / grid.step_x_m).floor() as u32);
        assert_eq!(grid.rows, (grid.height_m / grid.step_y_m).floor() as u32);
        assert_eq!(grid.cols, 43);
        assert!((43..=44).contains(&grid.rows));
        assert_eq!(grid.zoom, 18);
        assert!(grid.image_size_px[0] <= 640 && grid.image_size_px[1] <= 640);
        assert!(grid.tolerance_x_m > 1_700.0 && grid.tolerance_x_m < 1_900.0);
        assert!(grid.tolerance_y_m > 2_150.0 && grid.tolerance_y_m < 2_300.0);
    }

    #[test]
    fn test_overlap_shrinks_steps() {
        let mut params = memphis();
        params.overlap_percent = 50.0;
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();

        assert!((grid.step_x_m - grid.footprint.width_m / 2.0).abs() < 1e-9);
        assert!((grid.step_y_m - grid.footprint.height_m / 2.0).abs() < 1e-9);
        assert_eq!(grid.cols, (grid.width_m / grid.step_x_m).floor() as u32);
    }

    #[test]
    fn test_box_smaller_than_one_cell_is_invalid() {
        let mut params = memphis();
        params.bounds = BoundingBox::new(
            GeoPoint::new(35.1500, -89.9000).unwrap(),
            GeoPoint::new(35.1499, -89.8999).unwrap(),
        )
        .unwrap();
        let projector = projector_for(&params);
        assert!(matches!(
            MissionGrid::compute(&params, &projector),
            Err(MissionError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_fresh_cursor_starts_at_top_left() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();

        let cursor = grid.resume_cursor(None, &projector).unwrap();
        assert_eq!(
            cursor,
            MissionCursor::Next {
                col: 0,
                row: 0,
                center: params.bounds.top_left,
                position: grid.top_left,
            }
        );
        assert_eq!(grid.remaining(&cursor), grid.cell_count());
    }

    #[test]
    fn test_cursor_steps_east_within_row() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();
        let state = state_at(&grid, 3, 2, &projector);

        match grid.resume_cursor(Some(&state), &projector).unwrap() {
            MissionCursor::Next {
                col, row, position, ..
            } => {
                assert_eq!((col, row), (4, 2));
                let expected = grid.top_left.offset(4.0 * grid.step_x_m, -2.0 * grid.step_y_m);
                // File names round the centre to 1e-7°, about 1 cm
                assert!((position.x - expected.x).abs() < 0.05);
                assert!((position.y - expected.y).abs() < 0.05);
            }
            other => panic!("unexpected cursor {:?}", other),
        }
    }

    #[test]
    fn test_cursor_wraps_to_next_row() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();
        let state = state_at(&grid, grid.cols - 1, 0, &projector);

        let cursor = grid.resume_cursor(Some(&state), &projector).unwrap();
        match cursor {
            MissionCursor::Next {
                col, row, position, ..
            } => {
                assert_eq!((col, row), (0, 1));
                assert_eq!(position.x, grid.top_left.x);
                assert!((position.y - (grid.top_left.y - grid.step_y_m)).abs() < 0.05);
            }
            other => panic!("unexpected cursor {:?}", other),
        }
        assert_eq!(grid.remaining(&cursor), grid.cell_count() - grid.cols as u64);
    }

    #[test]
    fn test_last_cell_means_complete() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();
        let state = state_at(&grid, grid.cols - 1, grid.rows - 1, &projector);

        let cursor = grid.resume_cursor(Some(&state), &projector).unwrap();
        assert_eq!(cursor, MissionCursor::Complete);
        assert_eq!(grid.remaining(&cursor), 0);
    }

    #[test]
    fn test_state_outside_grid_is_mismatch() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();

        let mut state = state_at(&grid, 0, 0, &projector);
        state.last.col = grid.cols;
        assert!(matches!(
            grid.resume_cursor(Some(&state), &projector),
            Err(MissionError::GridMismatch(_))
        ));

        let mut state = state_at(&grid, 0, 0, &projector);
        state.last.zoom = grid.zoom - 1;
        assert!(matches!(
            grid.resume_cursor(Some(&state), &projector),
            Err(MissionError::GridMismatch(_))
        ));
    }

    #[test]
    fn test_foreign_projector_is_rejected() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();
        let other = GeoProjector::new(UtmZone::new(33, true).unwrap()).unwrap();

        assert!(matches!(
            grid.resume_cursor(None, &other),
            Err(MissionError::Projection(ProjectionError::ZoneMismatch { .. }))
        ));
    }

    #[test]
    fn test_walk_never_trips_bounds_check() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();

        let (mut col, mut row, mut position) = (0, 0, grid.top_left);
        let mut visited = 1u64;
        grid.check_bounds(col, row, position, grid.origin).unwrap();
        while let Some(next) = grid.advance(col, row, position) {
            (col, row, position) = next;
            grid.check_bounds(col, row, position, grid.origin).unwrap();
            visited += 1;
        }
        assert_eq!(visited, grid.cell_count());
        assert_eq!((col, row), (grid.cols - 1, grid.rows - 1));
    }

    #[test]
    fn test_drift_past_corner_is_out_of_bounds() {
        let params = memphis();
        let projector = projector_for(&params);
        let grid = MissionGrid::compute(&params, &projector).unwrap();

        let inside = grid
            .bottom_right
            .offset(grid.footprint.width_m + grid.tolerance_x_m - 1.0, 0.0);
        assert!(grid.check_bounds(1, 1, inside, grid.origin).is_ok());

        let east = grid
            .bottom_right
            .offset(grid.footprint.width_m + grid.tolerance_x_m + 1.0, 0.0);
        let err = grid.check_bounds(5, 6, east, grid.origin).unwrap_err();
        assert!(matches!(
            err,
            MissionError::OutOfBounds { col: 5, row: 6, .. }
        ));

        let south = grid
            .bottom_right
            .offset(0.0, -(grid.footprint.height_m + grid.tolerance_y_m + 1.0));
        assert!(grid.check_bounds(0, 9, south, grid.origin).is_err());
    }
}
