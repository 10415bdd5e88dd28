//! Logging bootstrap for the `th` binary.
//!
//! The library only emits `log` records; this module installs a
//! `flexi_logger` backend writing rotating files under the data
//! directory. Initialization is best-effort: a logger that cannot start
//! leaves the process running without logs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "taskhive";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Normalize a configured level name. Returns `None` for unknown names.
pub fn normalize_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        "off" | "none" => Some("off"),
        _ => None,
    }
}

/// Directory holding log files for a data directory
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Start file logging under `data_dir/logs`.
///
/// Repeated calls after a successful start are no-ops.
pub fn init(level: &str, data_dir: &Path) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = normalize_level(level).ok_or_else(|| {
        format!("unsupported log level `{level}`; expected trace|debug|info|warn|error|off")
    })?;
    if level == "off" {
        return Ok(());
    }

    let dir = log_dir(data_dir);
    std::fs::create_dir_all(&dir)
        .map_err(|err| format!("failed to create log directory `{}`: {err}", dir.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::Direct)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    let _ = LOGGER.set(handle);
    info!(
        "event=app_start module=cli status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        dir.display()
    );
    Ok(())
}
