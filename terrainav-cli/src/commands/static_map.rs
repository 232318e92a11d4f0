//! Static map command - one image from the Static Maps endpoint.
//!
//! Unlike `single`, which stitches public tiles, this makes a single keyed
//! request and stores the returned image as is.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use terrainav::coord::{static_map_bounds, zoom_and_size_for_bounds, BoundingBox, MAX_ZOOM};
use terrainav::geometry::{box_from_center_meters, footprint_meters, overlap_ratio};
use terrainav::mission::{capture_label, MissionError, PointCapture};

use super::common::{parse_point_coords, parse_size, resolve_point, CameraArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the static-map command.
#[derive(Debug, Args)]
pub struct StaticMapArgs {
    /// Map centre and camera altitude as `LAT_LON_ALT`
    #[arg(long, value_name = "LAT_LON_ALT", allow_hyphen_values = true)]
    pub coords: String,

    /// Zoom level; defaults to the tightest zoom showing the whole footprint
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Image size in pixels as `WxH`; defaults to the footprint size at the zoom
    #[arg(long, value_name = "WxH")]
    pub size: Option<String>,

    #[command(flatten)]
    pub camera: CameraArgs,
}

/// Run the static-map command.
pub fn run(args: StaticMapArgs) -> Result<(), CliError> {
    let (center, altitude) = parse_point_coords(&args.coords)?;
    let size_override = args.size.as_deref().map(parse_size).transpose()?;

    let runner = CliRunner::new()?;
    runner.log_startup("static-map");

    let (capture, data_dir) = resolve_point(center, altitude, &args.camera, runner.config())?;
    let (footprint_box, fit_zoom, fit_size) = footprint_fit(&capture)?;
    let zoom = args.zoom.unwrap_or(fit_zoom);
    let size = size_override.unwrap_or([fit_size[0].max(1), fit_size[1].max(1)]);

    let covered = static_map_bounds(capture.center, zoom, size).map_err(MissionError::from)?;
    let coverage = overlap_ratio(&footprint_box, &covered);

    let path = static_map_path(&capture, &data_dir, zoom);
    if path.exists() {
        println!("  {} (already present)", path.display());
        return Ok(());
    }

    let client = runner.static_map_client()?;
    let bytes = runner.block_on(client.fetch(capture.center, capture.map_type, zoom, size))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| CliError::FileWrite {
            path: parent.to_path_buf(),
            error,
        })?;
    }
    std::fs::write(&path, &bytes).map_err(|error| CliError::FileWrite {
        path: path.clone(),
        error,
    })?;

    info!(
        path = %path.display(),
        zoom,
        width = size[0],
        height = size[1],
        coverage,
        "Static map saved"
    );
    println!(
        "{} {} (zoom {}, {}x{} px)",
        style("✓").green(),
        path.display(),
        zoom,
        size[0],
        size[1]
    );
    Ok(())
}

/// Footprint box, plus the zoom and pixel size at which it fills one image.
fn footprint_fit(capture: &PointCapture) -> Result<(BoundingBox, u8, [u32; 2]), CliError> {
    let footprint = footprint_meters(
        capture.fov_deg,
        capture.altitude_m,
        capture.aspect_ratio.ratio(),
    )
    .map_err(MissionError::from)?;
    let bounds = box_from_center_meters(capture.center, footprint.width_m, footprint.height_m)
        .map_err(MissionError::from)?;
    let (zoom, size) = zoom_and_size_for_bounds(bounds.top_left, bounds.bottom_right, MAX_ZOOM)
        .map_err(MissionError::from)?;
    Ok((bounds, zoom, size))
}

/// `<data_dir>/<map_type>/static/<label>_z<zoom>.png`
fn static_map_path(capture: &PointCapture, data_dir: &std::path::Path, zoom: u8) -> PathBuf {
    let label = capture_label(
        capture.center,
        capture.altitude_m,
        capture.fov_deg,
        capture.aspect_ratio,
    );
    data_dir
        .join(capture.map_type.name())
        .join("static")
        .join(format!("{}_z{}.png", label, zoom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrainav::coord::GeoPoint;
    use terrainav::mission::AspectRatio;
    use terrainav::provider::MapType;

    fn capture(altitude_m: f64) -> PointCapture {
        PointCapture {
            center: GeoPoint {
                lat: 35.1375,
                lon: -89.8615,
            },
            altitude_m,
            fov_deg: 78.8,
            aspect_ratio: AspectRatio::default(),
            map_type: MapType::Satellite,
            resolution: 2,
        }
    }

    #[test]
    fn test_higher_camera_fits_at_lower_zoom() {
        let (_, low_zoom, _) = footprint_fit(&capture(1200.0)).unwrap();
        let (_, high_zoom, size) = footprint_fit(&capture(120.0)).unwrap();
        assert!(low_zoom < high_zoom);
        assert!(size[0] <= 640 && size[1] <= 640);
        assert!(size[0] > size[1]);
    }

    #[test]
    fn test_fitted_image_covers_most_of_footprint() {
        let capture = capture(120.0);
        let (footprint, zoom, size) = footprint_fit(&capture).unwrap();
        let covered = static_map_bounds(capture.center, zoom, size).unwrap();
        // Truncated pixel sizes lose at most a pixel per side
        assert!(overlap_ratio(&footprint, &covered) > 0.9);
    }

    #[test]
    fn test_path_layout() {
        let path = static_map_path(&capture(120.0), std::path::Path::new("data"), 18);
        assert_eq!(
            path,
            PathBuf::from("data/satellite/static/35.1375000_-89.8615000_120_78.8_4_3_z18.png")
        );
    }
}
