//! terrainav CLI - Command-line interface
//!
//! Builds geotagged aerial-image datasets from web map tiles.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::MissionArgs;
use commands::config::ConfigCommands;
use commands::list::ListArgs;
use commands::raster::RasterArgs;
use commands::single::SingleArgs;
use commands::static_map::StaticMapArgs;

#[derive(Parser)]
#[command(name = "terrainav")]
#[command(version)]
#[command(about = "Aerial image datasets from web map tiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a grid of images covering a bounding box (resumable)
    Raster(RasterArgs),

    /// Write the mission log and preview map without capturing the grid
    Preview(MissionArgs),

    /// Capture the footprint seen from one camera position
    Single(SingleArgs),

    /// Capture one footprint per line of a `lat lon alt` file
    List(ListArgs),

    /// Fetch one image from the Static Maps API (needs an API key)
    StaticMap(StaticMapArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Raster(args) => commands::raster::run(args),
        Commands::Preview(args) => commands::preview::run(args),
        Commands::Single(args) => commands::single::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::StaticMap(args) => commands::static_map::run(args),
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
