//! Where a mission keeps its files.
//!
//! ```text
//! <data_dir>/<map_type>/
//! ├── <label>.jpg                             preview map
//! ├── logs/log_<YYYY-mm-dd_HH-MM-SS>.json     one per run
//! └── raster_images_<overlap>_<label>/        cell images
//! ```

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use super::filename::CELL_EXTENSION;
use super::params::MissionParams;

/// Resolved output paths for one mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionLayout {
    root: PathBuf,
    raster_dir: PathBuf,
    preview_path: PathBuf,
    log_dir: PathBuf,
}

impl MissionLayout {
    pub fn new(data_dir: impl AsRef<Path>, params: &MissionParams) -> Self {
        let root = data_dir.as_ref().join(params.map_type.name());
        let label = params.label();

        Self {
            raster_dir: root.join(format!(
                "raster_images_{}_{}",
                params.overlap_percent, label
            )),
            preview_path: root.join(format!("{}.{}", label, CELL_EXTENSION)),
            log_dir: root.join("logs"),
            root,
        }
    }

    /// `<data_dir>/<map_type>`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the cell images.
    pub fn raster_dir(&self) -> &Path {
        &self.raster_dir
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Log file for a run started at `started`.
    pub fn log_path(&self, started: DateTime<Local>) -> PathBuf {
        self.log_dir
            .join(format!("log_{}.json", started.format("%Y-%m-%d_%H-%M-%S")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::params::tests::memphis;
    use crate::provider::MapType;
    use chrono::TimeZone;

    #[test]
    fn test_paths() {
        let layout = MissionLayout::new("dataset/Memphis", &memphis());

        assert_eq!(layout.root(), Path::new("dataset/Memphis/satellite"));
        assert_eq!(
            layout.raster_dir(),
            Path::new(
                "dataset/Memphis/satellite/raster_images_0_35.1375000_-89.8615000_120_78.8_4_3"
            )
        );
        assert_eq!(
            layout.preview_path(),
            Path::new("dataset/Memphis/satellite/35.1375000_-89.8615000_120_78.8_4_3.jpg")
        );
    }

    #[test]
    fn test_map_type_and_overlap_separate_missions() {
        let mut params = memphis();
        params.map_type = MapType::Roadmap;
        params.overlap_percent = 25.0;
        let layout = MissionLayout::new("data", &params);

        assert!(layout.root().ends_with("roadmap"));
        assert!(layout
            .raster_dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("raster_images_25_"));
    }

    #[test]
    fn test_log_path_uses_start_time() {
        let layout = MissionLayout::new("data", &memphis());
        let started = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            layout.log_path(started),
            Path::new("data/satellite/logs/log_2024-03-09_14-05-07.json")
        );
    }
}
