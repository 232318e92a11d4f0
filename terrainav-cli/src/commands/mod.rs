//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`raster`] - Capture a grid of images over a bounding box
//! - [`preview`] - Mission log and preview map only
//! - [`single`] - One footprint around a point
//! - [`list`] - One footprint per line of a coordinate file
//! - [`static_map`] - One keyed Static Maps image
//! - [`config`] - Configuration management (path, init, show)

pub mod common;
pub mod config;
pub mod list;
pub mod preview;
pub mod raster;
pub mod single;
pub mod static_map;
