//! Single command - capture the footprint seen from one camera position.

use clap::Args;
use console::style;

use terrainav::mission::{capture_point, PointOutcome, SaveOutcome};

use super::common::{parse_point_coords, resolve_point, CameraArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the single command.
#[derive(Debug, Args)]
pub struct SingleArgs {
    /// Camera position and altitude as `LAT_LON_ALT`
    #[arg(long, value_name = "LAT_LON_ALT", allow_hyphen_values = true)]
    pub coords: String,

    #[command(flatten)]
    pub camera: CameraArgs,
}

/// Run the single command.
pub fn run(args: SingleArgs) -> Result<(), CliError> {
    let (center, altitude) = parse_point_coords(&args.coords)?;

    let runner = CliRunner::new()?;
    runner.log_startup("single");

    let (capture, data_dir) = resolve_point(center, altitude, &args.camera, runner.config())?;
    let stitcher = runner.stitcher()?;

    let outcome = runner.block_on(capture_point(&stitcher, &capture, &data_dir))?;
    report_point(&outcome);
    Ok(())
}

/// Prints the result of one point capture.
pub(super) fn report_point(outcome: &PointOutcome) {
    match outcome.saved {
        SaveOutcome::Written => {
            println!("{} {}", style("✓").green(), outcome.path.display());
            if outcome.failed_tiles > 0 {
                println!("  {} tiles missing", outcome.failed_tiles);
            }
        }
        SaveOutcome::AlreadyPresent => {
            println!("  {} (already present)", outcome.path.display());
        }
    }
}
