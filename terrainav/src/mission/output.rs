//! Image persistence and single-box captures.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::{MissionError, MissionResult};
use crate::coord::{zoom_and_size_for_bounds, BoundingBox, MAX_ZOOM};
use crate::provider::{MapType, TileSource};
use crate::stitch::{Mosaic, TileStitcher};

/// Result of a write that never replaces existing files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    AlreadyPresent,
}

/// Hidden sibling used while an image is being written.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}

/// Encodes `image` as JPEG and moves it into place at `path`.
///
/// The bytes go to a hidden `.part` file first and are renamed once
/// complete, so `path` either holds a whole image or does not exist. An
/// existing file at `path` is left untouched.
pub async fn save_jpeg(image: RgbImage, path: &Path) -> MissionResult<SaveOutcome> {
    if tokio::fs::try_exists(path)
        .await
        .map_err(|e| MissionError::io(path, e))?
    {
        warn!(path = %path.display(), "Image already exists, not overwriting");
        return Ok(SaveOutcome::AlreadyPresent);
    }

    let encode_path = path.to_path_buf();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .map(|_| bytes)
            .map_err(|e| MissionError::Encode {
                path: encode_path,
                reason: e.to_string(),
            })
    })
    .await
    .map_err(|e| MissionError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })??;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MissionError::io(parent, e))?;
    }

    let temp_path = partial_path(path);
    tokio::fs::write(&temp_path, &bytes)
        .await
        .map_err(|e| MissionError::io(&temp_path, e))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| MissionError::io(path, e))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Image written");
    Ok(SaveOutcome::Written)
}

/// Stitches `bounds` at the zoom that fits it in one image plus `resolution`.
pub async fn capture_box<S: TileSource + 'static>(
    stitcher: &TileStitcher<S>,
    bounds: &BoundingBox,
    map_type: MapType,
    resolution: u8,
) -> MissionResult<Mosaic> {
    let (zoom, _) = zoom_and_size_for_bounds(bounds.top_left, bounds.bottom_right, MAX_ZOOM)?;
    Ok(stitcher
        .stitch(
            bounds.top_left,
            bounds.bottom_right,
            zoom,
            map_type,
            resolution,
        )
        .await?)
}
