//! Preview command - write the mission log and preview map only.
//!
//! Useful to check a bounding box before committing to the full raster.

use chrono::Local;

use terrainav::mission::RasterMissionPlanner;

use super::common::{resolve_mission, MissionArgs};
use super::raster::{print_plan, report_preview};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the preview command.
pub fn run(args: MissionArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("preview");

    let (params, data_dir) = resolve_mission(&args, runner.config())?;
    let planner = RasterMissionPlanner::new(runner.stitcher()?, params, &data_dir)?;

    let (_, cursor) = planner.resume_cursor()?;
    print_plan(&planner, planner.grid().remaining(&cursor));
    println!();

    runner.block_on(async {
        let log_path = planner.write_log(Local::now()).await?;
        println!("Mission log: {}", log_path.display());
        report_preview(&planner.write_preview().await?);
        Ok::<_, CliError>(())
    })
}
