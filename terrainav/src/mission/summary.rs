//! Per-run mission log.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

use super::error::{MissionError, MissionResult};
use super::grid::MissionGrid;
use super::params::MissionParams;
use crate::coord::GeoPoint;
use crate::projection::ProjectedPoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Corner {
    pub geo: GeoPoint,
    pub utm: ProjectedPoint,
}

/// Size of the whole box rendered as one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSize {
    pub zoom: u8,
    pub pixels: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterCounts {
    pub cols: u32,
    pub rows: u32,
    pub total: u64,
    pub on_disk: usize,
}

/// What a mission run was asked to do, written as JSON next to its output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSummary {
    pub started: DateTime<Local>,
    pub params: MissionParams,
    pub epsg: String,
    pub top_left: Corner,
    pub bottom_right: Corner,
    /// `None` when the box is too small to render as one image
    pub map_size: Option<MapSize>,
    pub map_width_m: f64,
    pub map_height_m: f64,
    pub map_area_m2: f64,
    pub image_width_m: f64,
    pub image_height_m: f64,
    pub image_size_px: [u32; 2],
    pub zoom: u8,
    pub raster: RasterCounts,
}

impl MissionSummary {
    pub fn new(
        started: DateTime<Local>,
        params: &MissionParams,
        grid: &MissionGrid,
        map_size: Option<MapSize>,
        on_disk: usize,
    ) -> Self {
        Self {
            started,
            params: params.clone(),
            epsg: grid.zone.epsg(),
            top_left: Corner {
                geo: grid.origin,
                utm: grid.top_left,
            },
            bottom_right: Corner {
                geo: grid.limit,
                utm: grid.bottom_right,
            },
            map_size,
            map_width_m: grid.width_m,
            map_height_m: grid.height_m,
            map_area_m2: grid.area_m2(),
            image_width_m: grid.footprint.width_m,
            image_height_m: grid.footprint.height_m,
            image_size_px: grid.image_size_px,
            zoom: grid.zoom,
            raster: RasterCounts {
                cols: grid.cols,
                rows: grid.rows,
                total: grid.cell_count(),
                on_disk,
            },
        }
    }

    /// Writes the summary as pretty JSON, creating parent directories.
    pub async fn write(&self, path: &Path) -> MissionResult<()> {
        let json =
            serde_json::to_vec_pretty(self).map_err(|e| MissionError::Log(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MissionError::io(parent, e))?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| MissionError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::params::tests::memphis;
    use crate::projection::GeoProjector;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_json_log() {
        let params = memphis();
        let projector = GeoProjector::for_point(params.bounds.center()).unwrap();
        let grid = MissionGrid::compute(&params, &projector).unwrap();
        let summary = MissionSummary::new(
            Local::now(),
            &params,
            &grid,
            Some(MapSize {
                zoom: 13,
                pixels: [448, 380],
            }),
            0,
        );

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("log.json");
        summary.write(&path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["epsg"], "EPSG:32616");
        assert_eq!(value["params"]["map_type"], "satellite");
        assert_eq!(value["raster"]["cols"], grid.cols);
        assert_eq!(value["raster"]["total"], grid.cell_count());
        assert_eq!(value["map_size"]["zoom"], 13);
        assert_eq!(value["top_left"]["geo"]["lat"], 35.16);
    }
}
