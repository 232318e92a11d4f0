//! Raster command - capture a grid of images over a bounding box.

use chrono::Local;
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing::{info, warn};

use terrainav::mission::{MissionCursor, MissionStatus, PreviewOutcome, RasterMissionPlanner};
use terrainav::provider::TileSource;

use super::common::{image_progress, resolve_mission, MissionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the raster command.
#[derive(Debug, Args)]
pub struct RasterArgs {
    #[command(flatten)]
    pub mission: MissionArgs,

    /// Start without asking for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

/// Run the raster command.
pub fn run(args: RasterArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("raster");

    let (params, data_dir) = resolve_mission(&args.mission, runner.config())?;
    let planner = RasterMissionPlanner::new(runner.stitcher()?, params, &data_dir)?;

    let (_, cursor) = planner.resume_cursor()?;
    let total = planner.grid().cell_count();
    let remaining = planner.grid().remaining(&cursor);
    print_plan(&planner, remaining);

    if let MissionCursor::Next { col, row, .. } = cursor {
        if remaining < total {
            println!("Resuming at column {}, row {}", col, row);
        }
    }
    println!();

    if remaining > 0 && !args.yes && !confirm(remaining)? {
        println!("Aborted.");
        return Ok(());
    }

    let cancel = runner.cancellation_on_ctrlc()?;

    let outcome = runner.block_on(async {
        let log_path = planner.write_log(Local::now()).await?;
        println!("Mission log: {}", log_path.display());

        // The walk does not depend on the preview, so a failed preview only warns.
        match planner.write_preview().await {
            Ok(preview) => report_preview(&preview),
            Err(e) => {
                warn!(error = %e, "Preview map skipped");
                println!("{} Preview map skipped: {}", style("!").yellow(), e);
            }
        }

        let bar = image_progress(total, total - remaining);
        let outcome = planner
            .run(&cancel, |cell| {
                bar.inc(1);
                if cell.tiles_failed > 0 {
                    bar.set_message(format!("{} tiles missing", cell.tiles_failed));
                }
            })
            .await;
        bar.finish_and_clear();

        Ok::<_, CliError>(outcome?)
    })?;

    match outcome.status {
        MissionStatus::Complete => {
            println!(
                "{} Mission complete: {} images written this run",
                style("✓").green(),
                outcome.produced
            );
        }
        MissionStatus::Interrupted => {
            println!(
                "{} Interrupted after {} images. Run the same command to resume.",
                style("!").yellow(),
                outcome.produced
            );
        }
    }
    if outcome.degraded > 0 {
        println!(
            "  {} images have missing tiles ({} tiles in total)",
            outcome.degraded, outcome.failed_tiles
        );
    }
    println!("  Output: {}", planner.layout().raster_dir().display());

    info!(
        produced = outcome.produced,
        degraded = outcome.degraded,
        "Raster command finished"
    );
    Ok(())
}

fn confirm(remaining: u64) -> Result<bool, CliError> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Download {} images?", remaining))
        .default(true)
        .interact()
        .map_err(|e| CliError::Prompt(e.to_string()))
}

/// Prints the sizing of a mission.
pub(super) fn print_plan<S: TileSource + 'static>(planner: &RasterMissionPlanner<S>, remaining: u64) {
    let params = planner.params();
    let grid = planner.grid();

    println!("{}", style(format!("Mission {}", params.label())).bold());
    println!(
        "  Area:       {} -> {} ({})",
        params.bounds.top_left, params.bounds.bottom_right, grid.zone
    );
    println!(
        "  Map size:   {:.0} x {:.0} m ({:.2} km²)",
        grid.width_m,
        grid.height_m,
        grid.area_m2() / 1_000_000.0
    );
    println!(
        "  Footprint:  {:.1} x {:.1} m, zoom {} + {}, {}x{} px",
        grid.footprint.width_m,
        grid.footprint.height_m,
        grid.zoom,
        params.resolution,
        grid.image_size_px[0],
        grid.image_size_px[1]
    );
    println!(
        "  Grid:       {} x {} = {} images, {} remaining",
        grid.cols,
        grid.rows,
        grid.cell_count(),
        remaining
    );
    println!("  Output:     {}", planner.layout().raster_dir().display());
}

/// Prints where the preview map went.
pub(super) fn report_preview(preview: &PreviewOutcome) {
    match preview {
        PreviewOutcome::Written { path, failed_tiles } => {
            println!("Preview map: {}", path.display());
            if *failed_tiles > 0 {
                println!("  {} tiles missing", failed_tiles);
            }
        }
        PreviewOutcome::AlreadyPresent(path) => {
            println!("Preview map: {} (already present)", path.display());
        }
    }
}
