//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging, the async runtime and the tile
//! pipeline so command handlers stay short.

use std::future::Future;
use std::path::Path;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use terrainav::config::ConfigFile;
use terrainav::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use terrainav::provider::{AsyncReqwestClient, GoogleTileProvider, StaticMapClient};
use terrainav::stitch::TileStitcher;

use crate::error::CliError;

/// Stitcher over the public Google tile servers.
pub type GoogleStitcher = TileStitcher<GoogleTileProvider<AsyncReqwestClient>>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Loads config, initializes logging and starts the async runtime.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(Path::new(default_log_dir()), default_log_file())
            .map_err(CliError::LoggingInit)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Setup(format!("async runtime: {}", e)))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("terrainav v{}", terrainav::VERSION);
        info!("terrainav CLI: {} command", command);
    }

    /// Drives `future` to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn http_client(&self) -> Result<AsyncReqwestClient, CliError> {
        Ok(AsyncReqwestClient::with_timeout(
            self.config.download.timeout,
        )?)
    }

    /// Tile stitcher configured from the `[download]` section.
    pub fn stitcher(&self) -> Result<GoogleStitcher, CliError> {
        let provider = GoogleTileProvider::new(self.http_client()?);
        Ok(TileStitcher::new(
            provider,
            self.config.download.stitch_config(),
        ))
    }

    /// Static map client with the configured API key.
    pub fn static_map_client(&self) -> Result<StaticMapClient<AsyncReqwestClient>, CliError> {
        Ok(StaticMapClient::new(
            self.http_client()?,
            self.config.provider.google_api_key.clone(),
        ))
    }

    /// Token cancelled on the first Ctrl-C.
    ///
    /// Work stops between two images; whatever is on disk stays valid.
    pub fn cancellation_on_ctrlc(&self) -> Result<CancellationToken, CliError> {
        let token = CancellationToken::new();
        let handler_token = token.clone();

        ctrlc::set_handler(move || {
            if !handler_token.is_cancelled() {
                warn!("Interrupt received, stopping after the current image");
            }
            handler_token.cancel();
        })
        .map_err(|e| CliError::Setup(format!("Ctrl-C handler: {}", e)))?;

        Ok(token)
    }
}
