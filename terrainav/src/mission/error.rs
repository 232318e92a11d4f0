//! Mission error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::coord::{CoordError, GeoPoint};
use crate::geometry::GeometryError;
use crate::projection::ProjectionError;
use crate::provider::ProviderError;
use crate::stitch::StitchError;

use super::filename::CellNameError;

/// Result alias for mission operations.
pub type MissionResult<T> = Result<T, MissionError>;

/// Errors that stop a mission.
///
/// Per-tile fetch failures are not listed here; they degrade the affected
/// cell and are reported through its [`Mosaic`](crate::stitch::Mosaic).
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The walk drifted past the bottom-right corner of the mission box.
    #[error(
        "Cell ({col}, {row}) at {position} is past the bottom-right limit {limit} \
         by more than the allowed tolerance"
    )]
    OutOfBounds {
        position: GeoPoint,
        col: u32,
        row: u32,
        limit: GeoPoint,
    },

    /// Files on disk do not belong to the grid computed for these parameters.
    #[error("Existing output does not match the mission grid: {0}")]
    GridMismatch(String),

    #[error("Malformed cell file name in {}: {source}", .path.display())]
    MalformedFileName {
        path: PathBuf,
        #[source]
        source: CellNameError,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode image for {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to write mission log: {0}")]
    Log(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl MissionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MissionError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by a drifting walk or an unrenderable zoom.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            MissionError::OutOfBounds { .. }
                | MissionError::Coord(CoordError::OutOfBounds { .. })
        )
    }
}
