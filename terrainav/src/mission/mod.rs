//! Raster missions.
//!
//! A mission lays a grid of camera footprints over a bounding box and
//! produces one stitched image per cell, walking row by row from the
//! top-left corner. Progress lives entirely in the output file names, so a
//! mission stopped at any point continues where it left off:
//!
//! ```text
//! Sizing ──► Resuming ──► Walking ──► Complete
//!   │          │  (scan names)  │
//!   │          └─► Starting ────┘
//!   └─ grid, zoom, UTM zone
//! ```
//!
//! Steps between cells are taken in UTM meters and converted back to
//! geographic coordinates for the stitcher.

mod error;
mod filename;
mod grid;
mod layout;
mod output;
mod params;
mod planner;
mod point;
mod state;
mod summary;

pub use error::{MissionError, MissionResult};
pub use filename::{CellName, CellNameError, CELL_EXTENSION};
pub use grid::{MissionCursor, MissionGrid};
pub use layout::MissionLayout;
pub use output::{capture_box, save_jpeg, SaveOutcome};
pub use params::{capture_label, AspectRatio, MissionParams};
pub use planner::{
    CellReport, MissionOutcome, MissionStatus, PreviewOutcome, RasterMissionPlanner,
};
pub use point::{capture_point, PointCapture, PointOutcome};
pub use state::MissionState;
pub use summary::{Corner, MapSize, MissionSummary, RasterCounts};
