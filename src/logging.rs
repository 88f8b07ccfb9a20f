//! Logging configuration using the tracing ecosystem.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's job. [`init`] writes to a daily-rotated file so command output
//! on stdout stays clean, and [`init_stderr`] is for interactive debugging.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log filter if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jirakit=info,warn";

/// Initialize file logging.
///
/// Logs go to `<local data dir>/jirakit/logs/jirakit.log.<date>`; the level
/// is taken from `RUST_LOG` (e.g. `RUST_LOG=jirakit=debug`).
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// if a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "jirakit.log");

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(env_filter());

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jirakit starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// Initialize logging to stderr.
pub fn init_stderr() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(env_filter());

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("jirakit").join("logs"))
}

/// Get the path where logs are stored, if it can be determined.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}
