//! Logging configuration using tracing
//!
//! Diagnostic logs (remote command lines, raw device output) always go to a
//! daily-rolling file. User-facing progress is the job of [`crate::reporter`].

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_FILE_PREFIX: &str = "tzbridge.log";
const DEFAULT_FILTER: &str = "tizen_bridge=info,tzb_app=info,tzb_sdb=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/tizen-bridge/logs/` unless
/// `TZBRIDGE_LOG_DIR` points elsewhere. Log level is controlled by the
/// `TZBRIDGE_LOG` environment variable. With `verbose`, debug events are
/// mirrored to stderr as well.
///
/// # Examples
/// ```bash
/// TZBRIDGE_LOG=debug tzbridge install
/// TZBRIDGE_LOG=tzb_sdb=trace tzbridge push
/// ```
pub fn init(verbose: bool) -> Result<()> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let env_filter =
        EnvFilter::try_from_env("TZBRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_filter(env_filter);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(EnvFilter::new("tizen_bridge=debug,tzb_app=debug,tzb_sdb=debug"))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Tizen Bridge starting (log directory: {})", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> PathBuf {
    if let Ok(dir) = std::env::var("TZBRIDGE_LOG_DIR") {
        return PathBuf::from(dir);
    }
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("tizen-bridge").join("logs")
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> PathBuf {
    get_log_directory().join(LOG_FILE_PREFIX)
}
