//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use terrainav::config::{ConfigFile, MissionSettings};
use terrainav::coord::{BoundingBox, GeoPoint};
use terrainav::mission::{AspectRatio, MissionParams, PointCapture};
use terrainav::provider::MapType;

use crate::error::CliError;

/// Map layer selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum MapTypeArg {
    /// Aerial imagery
    Satellite,
    /// Street map
    Roadmap,
    /// Shaded relief
    Terrain,
}

impl From<MapTypeArg> for MapType {
    fn from(arg: MapTypeArg) -> Self {
        match arg {
            MapTypeArg::Satellite => MapType::Satellite,
            MapTypeArg::Roadmap => MapType::Roadmap,
            MapTypeArg::Terrain => MapType::Terrain,
        }
    }
}

/// Camera and output options shared by every capture command.
#[derive(Debug, Clone, Default, Args)]
pub struct CameraArgs {
    /// Diagonal field of view of the camera in degrees
    #[arg(long)]
    pub fov: Option<f64>,

    /// Image aspect ratio, e.g. `--aspect-ratio 4 3`
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    pub aspect_ratio: Option<Vec<f64>>,

    /// Map layer to capture
    #[arg(long, value_enum)]
    pub map_type: Option<MapTypeArg>,

    /// Zoom levels added on top of the footprint zoom
    #[arg(long)]
    pub resolution: Option<u8>,

    /// Root directory of the dataset
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl CameraArgs {
    /// Overlays the given flags on `settings`.
    pub fn apply(&self, settings: &mut MissionSettings) -> Result<(), CliError> {
        if let Some(fov) = self.fov {
            settings.fov = fov;
        }
        if let Some(values) = &self.aspect_ratio {
            settings.aspect_ratio = aspect_ratio_from(values)?;
        }
        if let Some(map_type) = self.map_type {
            settings.map_type = map_type.into();
        }
        if let Some(resolution) = self.resolution {
            settings.resolution = resolution;
        }
        if let Some(data_dir) = &self.data_dir {
            settings.data_dir = data_dir.clone();
        }
        Ok(())
    }
}

/// Options of the commands that plan a whole mission.
#[derive(Debug, Clone, Default, Args)]
pub struct MissionArgs {
    /// Bounding box and altitude as `TL_LAT_TL_LON_BR_LAT_BR_LON_ALT`
    #[arg(long, value_name = "TL_LAT_TL_LON_BR_LAT_BR_LON_ALT", allow_hyphen_values = true)]
    pub coords: Option<String>,

    /// Percent of a footprint shared with its neighbour, in [0, 100)
    #[arg(long)]
    pub overlap: Option<f64>,

    #[command(flatten)]
    pub camera: CameraArgs,
}

/// Resolve mission parameters from CLI args and config.
///
/// CLI takes precedence, then config, then built-in defaults.
pub fn resolve_mission(
    args: &MissionArgs,
    config: &ConfigFile,
) -> Result<(MissionParams, PathBuf), CliError> {
    let mut settings = config.mission.clone();

    if let Some(coords) = &args.coords {
        let (bounds, altitude) = parse_box_coords(coords)?;
        settings.bounds = bounds;
        settings.altitude = altitude;
    }
    if let Some(overlap) = args.overlap {
        settings.overlap = overlap;
    }
    args.camera.apply(&mut settings)?;

    Ok((settings.to_params(), settings.data_dir))
}

/// Resolve a point capture from a centre, an altitude and the camera flags.
pub fn resolve_point(
    center: GeoPoint,
    altitude_m: f64,
    camera: &CameraArgs,
    config: &ConfigFile,
) -> Result<(PointCapture, PathBuf), CliError> {
    let mut settings = config.mission.clone();
    settings.altitude = altitude_m;
    camera.apply(&mut settings)?;

    let capture = PointCapture {
        center,
        altitude_m: settings.altitude,
        fov_deg: settings.fov,
        aspect_ratio: settings.aspect_ratio,
        map_type: settings.map_type,
        resolution: settings.resolution,
    };
    Ok((capture, settings.data_dir))
}

fn aspect_ratio_from(values: &[f64]) -> Result<AspectRatio, CliError> {
    match values {
        [w, h] if w.is_finite() && h.is_finite() && *w > 0.0 && *h > 0.0 => {
            Ok(AspectRatio::new(*w, *h))
        }
        _ => Err(CliError::InvalidArgument(format!(
            "aspect ratio {:?} must be two positive numbers",
            values
        ))),
    }
}

/// Splits an underscore separated list of numbers.
pub fn parse_floats(text: &str) -> Result<Vec<f64>, CliError> {
    text.trim()
        .split('_')
        .map(|part| {
            part.trim().parse::<f64>().map_err(|_| {
                CliError::InvalidArgument(format!("'{}' in '{}' is not a number", part, text))
            })
        })
        .collect()
}

fn geo_point(lat: f64, lon: f64) -> Result<GeoPoint, CliError> {
    GeoPoint::new(lat, lon).map_err(|e| CliError::InvalidArgument(e.to_string()))
}

/// Parses `TL_LAT_TL_LON_BR_LAT_BR_LON_ALT`.
pub fn parse_box_coords(text: &str) -> Result<(BoundingBox, f64), CliError> {
    match parse_floats(text)?.as_slice() {
        &[tl_lat, tl_lon, br_lat, br_lon, altitude] => {
            let bounds = BoundingBox::new(geo_point(tl_lat, tl_lon)?, geo_point(br_lat, br_lon)?)
                .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            Ok((bounds, altitude))
        }
        values => Err(CliError::InvalidArgument(format!(
            "expected TL_LAT_TL_LON_BR_LAT_BR_LON_ALT, got {} values in '{}'",
            values.len(),
            text
        ))),
    }
}

/// Parses `LAT_LON_ALT`.
///
/// A full box string is accepted too; its top-left corner becomes the
/// centre and the bottom-right corner is ignored.
pub fn parse_point_coords(text: &str) -> Result<(GeoPoint, f64), CliError> {
    match parse_floats(text)?.as_slice() {
        &[lat, lon, altitude] | &[lat, lon, _, _, altitude] => {
            Ok((geo_point(lat, lon)?, altitude))
        }
        values => Err(CliError::InvalidArgument(format!(
            "expected LAT_LON_ALT, got {} values in '{}'",
            values.len(),
            text
        ))),
    }
}

/// Parses a whitespace separated `lat lon alt` list.
///
/// Blank lines, `#` comments and a non-numeric header line are skipped.
pub fn parse_coordinate_list(text: &str) -> Result<Vec<(GeoPoint, f64)>, String> {
    let mut points = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let numbers: Result<Vec<f64>, _> = fields.iter().map(|f| f.parse::<f64>()).collect();
        let numbers = match numbers {
            Ok(numbers) => numbers,
            Err(_) if points.is_empty() && is_header(&fields) => continue,
            Err(_) => return Err(format!("line {}: '{}' is not numeric", index + 1, line)),
        };

        match numbers.as_slice() {
            &[lat, lon, altitude] => {
                let point = GeoPoint::new(lat, lon)
                    .map_err(|e| format!("line {}: {}", index + 1, e))?;
                points.push((point, altitude));
            }
            other => {
                return Err(format!(
                    "line {}: expected 'lat lon alt', got {} values",
                    index + 1,
                    other.len()
                ))
            }
        }
    }

    Ok(points)
}

fn is_header(fields: &[&str]) -> bool {
    fields.iter().all(|f| f.parse::<f64>().is_err())
}

/// Reads and parses a coordinate list file.
pub fn read_coordinate_list(path: &Path) -> Result<Vec<(GeoPoint, f64)>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::CoordinateFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_coordinate_list(&text).map_err(|reason| CliError::CoordinateFile {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parses `WxH` into pixel dimensions.
pub fn parse_size(text: &str) -> Result<[u32; 2], CliError> {
    let invalid = || CliError::InvalidArgument(format!("size '{}' must look like 640x480", text));
    let (w, h) = text
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok([w, h])
}

/// Progress bar for `len` images, starting at `done`.
pub fn image_progress(len: u64, done: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>5}/{len:5} {percent}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    bar.set_style(style);
    bar.set_position(done);
    bar
}
