//! List command - capture one footprint per line of a coordinate file.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use terrainav::mission::{capture_point, SaveOutcome};

use super::common::{image_progress, read_coordinate_list, resolve_point, CameraArgs};
use super::single::report_point;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Whitespace separated file with one `lat lon alt` per line
    #[arg(long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub camera: CameraArgs,
}

/// Run the list command.
pub fn run(args: ListArgs) -> Result<(), CliError> {
    let points = read_coordinate_list(&args.file)?;
    if points.is_empty() {
        println!("No coordinates in {}", args.file.display());
        return Ok(());
    }

    let runner = CliRunner::new()?;
    runner.log_startup("list");
    info!(file = %args.file.display(), points = points.len(), "Coordinate list loaded");

    let stitcher = runner.stitcher()?;
    let cancel = runner.cancellation_on_ctrlc()?;

    let written = runner.block_on(async {
        let bar = image_progress(points.len() as u64, 0);
        let mut written = 0usize;

        for (center, altitude) in &points {
            if cancel.is_cancelled() {
                break;
            }
            let (capture, data_dir) =
                resolve_point(*center, *altitude, &args.camera, runner.config())?;
            let outcome = capture_point(&stitcher, &capture, &data_dir).await?;
            if outcome.saved == SaveOutcome::Written {
                written += 1;
            }
            bar.suspend(|| report_point(&outcome));
            bar.inc(1);
        }

        bar.finish_and_clear();
        Ok::<_, CliError>(written)
    })?;

    if cancel.is_cancelled() {
        println!("Interrupted; {} images written", written);
    } else {
        println!("{} of {} images written", written, points.len());
    }
    Ok(())
}
