//! Session logging.
//!
//! Every run starts with an empty `logs/terrainav.log`. Events go to that
//! file in full and to stdout in compact form. `RUST_LOG` overrides the
//! `info` default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

/// Holds the background writer of the session log open.
///
/// Buffered lines are flushed when this is dropped.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Creates `log_dir` and truncates `log_file` inside it.
pub fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let session_log = log_dir.join(log_file);
    fs::File::create(&session_log)?;
    Ok(session_log)
}

/// Installs the global subscriber writing to `log_dir/log_file` and stdout.
///
/// Fails when the session log cannot be created or truncated. Must be called
/// at most once per process.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir, log_file)?;

    let (session_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, log_file));

    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(session_writer)
                .with_ansi(false)
                .with_thread_names(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_target(false)
                .compact(),
        )
        .init();

    Ok(LoggingGuard { _file_guard: guard })
}

/// Default log directory.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "terrainav.log"
}
