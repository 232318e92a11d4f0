//! Configuration management CLI commands.
//!
//! Provides `config path`, `config init` and `config show`.

use clap::Subcommand;
use terrainav::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a default configuration file unless one exists
    Init,

    /// Print the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
        ConfigCommands::Show => run_show(),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_init() -> Result<(), CliError> {
    let existed = config_file_path().exists();
    let path = ConfigFile::ensure_exists()?;

    if existed {
        println!("Configuration file already exists: {}", path.display());
    } else {
        println!("Configuration file: {}", path.display());
        println!();
        println!("Edit this file to set the default mission and your Google API key.");
    }
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

/// Prints the configuration with defaults filled in.
fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    println!("; {}", config_file_path().display());
    print!("{}", config.to_ini_string());
    Ok(())
}
