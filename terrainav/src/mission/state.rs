//! Mission progress recovered from the output directory.

use std::path::Path;
use tracing::debug;

use super::error::{MissionError, MissionResult};
use super::filename::{CellName, CELL_EXTENSION};

/// Progress of a mission as recorded by the names of its output files.
///
/// There is no separate checkpoint; the images themselves are the state.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionState {
    /// Most recently completed cell, the largest by (row, col)
    pub last: CellName,
    /// Number of cell images found
    pub cells_on_disk: usize,
}

impl MissionState {
    /// Scans `dir` for cell images.
    ///
    /// Returns `Ok(None)` when the directory does not exist or holds no
    /// images. Every `*.jpg` must parse as a [`CellName`]; one that does not
    /// fails the scan rather than being skipped. Temporary `.part` files
    /// left by an interrupted write are ignored.
    pub fn scan(dir: &Path) -> MissionResult<Option<Self>> {
        if !dir.exists() {
            return Ok(None);
        }

        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            CELL_EXTENSION
        );
        let entries = glob::glob(&pattern).map_err(|e| {
            MissionError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
            )
        })?;

        let mut last: Option<CellName> = None;
        let mut zoom: Option<u8> = None;
        let mut cells_on_disk = 0;

        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                MissionError::io(path, std::io::Error::new(e.error().kind(), e.to_string()))
            })?;
            let name = parse_path(&path)?;

            match zoom {
                Some(z) if z != name.zoom => {
                    return Err(MissionError::GridMismatch(format!(
                        "{} mixes cells of zoom {} and {}",
                        dir.display(),
                        z,
                        name.zoom
                    )));
                }
                _ => zoom = Some(name.zoom),
            }

            cells_on_disk += 1;
            if last.map_or(true, |l| name.order_key() > l.order_key()) {
                last = Some(name);
            }
        }

        debug!(dir = %dir.display(), cells_on_disk, last = ?last, "Scanned mission directory");

        Ok(last.map(|last| Self {
            last,
            cells_on_disk,
        }))
    }
}

fn parse_path(path: &Path) -> MissionResult<CellName> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    CellName::parse(&file_name).map_err(|source| MissionError::MalformedFileName {
        path: path.to_path_buf(),
        source,
    })
}
