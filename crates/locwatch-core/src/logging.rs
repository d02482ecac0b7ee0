//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_FILE_NAME: &str = "locwatch.log";
const LOG_ENV_VAR: &str = "LOCWATCH_LOG";

/// Info for every locwatch crate, warnings from everything else
const DEFAULT_DIRECTIVES: &str =
    "locwatch=info,locwatch_core=info,locwatch_platform=info,locwatch_app=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/locwatch/logs/`; stdout is left to
/// the headless driver's event stream.
/// Log level is controlled by `LOCWATCH_LOG` environment variable.
///
/// # Examples
/// ```bash
/// LOCWATCH_LOG=debug locwatch
/// LOCWATCH_LOG=locwatch_app=trace locwatch
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!(
        "locwatch starting, logging to {}",
        get_current_log_file()?.display()
    );

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("locwatch").join("logs"))
}

/// Base path of the rolling log file
///
/// The daily appender suffixes this name with the date, so the file on disk
/// for today is `locwatch.log.YYYY-MM-DD` in the same directory.
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(LOG_FILE_NAME))
}
