//! User configuration in `~/.terrainav/config.ini`.
//!
//! Values given on the command line take precedence over the file, which
//! takes precedence over the built-in defaults in [`defaults`].
//!
//! ```ignore
//! use terrainav::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let stitch = config.download.stitch_config();
//! ```

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DownloadSettings, MissionSettings, ProviderSettings};
