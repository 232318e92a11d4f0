//! terrainav - Geotagged aerial-image datasets from web map tiles
//!
//! This library tiles a geographic bounding box into a raster of camera
//! footprints and stitches one map image per footprint. Each image's
//! position is recorded in its file name, which also lets an interrupted
//! mission resume where it stopped.
//!
//! # High-Level API
//!
//! ```ignore
//! use terrainav::mission::RasterMissionPlanner;
//! use terrainav::provider::{AsyncReqwestClient, GoogleTileProvider};
//! use terrainav::stitch::{StitchConfig, TileStitcher};
//!
//! let provider = GoogleTileProvider::new(AsyncReqwestClient::new()?);
//! let stitcher = TileStitcher::new(provider, StitchConfig::default());
//! let planner = RasterMissionPlanner::new(stitcher, params, "dataset/Memphis")?;
//!
//! let outcome = planner.run(&cancel, |cell| println!("{}", cell.path.display())).await?;
//! ```

pub mod config;
pub mod coord;
pub mod geometry;
pub mod logging;
pub mod mission;
pub mod projection;
pub mod provider;
pub mod stitch;

/// Version of the terrainav library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
