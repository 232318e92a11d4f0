//! Errors surfaced to the terminal, with recovery hints where one exists.

use std::fmt;
use std::path::PathBuf;
use std::process;

use terrainav::config::ConfigFileError;
use terrainav::mission::MissionError;
use terrainav::provider::ProviderError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Session log could not be set up
    LoggingInit(std::io::Error),
    /// Runtime or signal handler could not be started
    Setup(String),
    /// Config file unreadable or invalid
    Config(ConfigFileError),
    /// Bad command-line input
    InvalidArgument(String),
    /// Coordinate list could not be read
    CoordinateFile { path: PathBuf, reason: String },
    /// Mission sizing or walk failed
    Mission(MissionError),
    /// Static map request failed
    Provider(ProviderError),
    /// Failed to write output file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// Interactive prompt failed
    Prompt(String),
}

impl CliError {
    /// Prints the error and any hint to stderr, then exits with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Mission(MissionError::OutOfBounds { .. }) => {
                eprintln!();
                eprintln!("The walk left the mission area. Images written so far are kept.");
                eprintln!("Remove stray images from the raster directory if the box changed,");
                eprintln!("then run the same command again to resume.");
            }
            CliError::Mission(MissionError::MalformedFileName { .. })
            | CliError::Mission(MissionError::GridMismatch(_)) => {
                eprintln!();
                eprintln!("The raster directory holds images that do not belong to this mission.");
                eprintln!("Move them away or choose another --data-dir.");
            }
            CliError::Provider(ProviderError::MissingApiKey) => {
                eprintln!();
                eprintln!("Set google_api_key in the [provider] section of:");
                eprintln!("  {}", terrainav::config::config_file_path().display());
            }
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value or delete the line to fall back to the default.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Cannot open session log: {}", e),
            CliError::Setup(msg) => write!(f, "Startup failed: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::CoordinateFile { path, reason } => {
                write!(f, "Failed to read '{}': {}", path.display(), reason)
            }
            CliError::Mission(e) => write!(f, "Mission failed: {}", e),
            CliError::Provider(e) => write!(f, "Map request failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Mission(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<MissionError> for CliError {
    fn from(e: MissionError) -> Self {
        CliError::Mission(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}
