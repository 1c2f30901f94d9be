//! Logging for the launcher and player processes.
//!
//! Both processes log to stdout (colored) and to their own file in the shared log
//! directory, so a launcher and its player never interleave lines in one file.

use crate::error::DesktopError;

use common::ErrorLocation;

use std::fmt::{Arguments, Display};
use std::fs::create_dir_all;
use std::io::stdout;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Which process is logging. Decides the file name and the line prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Launcher,
    Player,
}

impl LogTarget {
    pub fn file_name(&self) -> &'static str {
        match self {
            LogTarget::Launcher => "launcher.log",
            LogTarget::Player => "player.log",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            LogTarget::Launcher => "launcher",
            LogTarget::Player => "player",
        }
    }

    pub fn log_file(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(self.file_name())
    }
}

/// Initialize logging for `target` once per process; later calls warn and return Ok.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created, or fern refuses
/// the dispatch.
pub fn initialize(log_dir: &Path, target: LogTarget) -> Result<(), DesktopError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, target);
        if result.is_ok() {
            info!(
                "Logging {} at {LOG_LEVEL:?} to {}",
                target.tag(),
                target.log_file(log_dir).display()
            );
        }
    });

    result
}

fn write_line(
    out: FormatCallback,
    tag: &str,
    level: impl Display,
    message: &Arguments,
    record: &Record,
) {
    out.finish(format_args!(
        "[{date} - {tag} - {level}] {message} [{file}:{line}]",
        date = format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}

#[track_caller]
pub(crate) fn initialize_internal(log_dir: &Path, target: LogTarget) -> Result<(), DesktopError> {
    create_dir_all(log_dir).map_err(|e| DesktopError::Desktop {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let log_file_path = target.log_file(log_dir);
    let tag = target.tag();

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, tag, colors.color(record.level()), message, record)
        })
        .chain(stdout());

    let log_file = fern::log_file(&log_file_path).map_err(|e| DesktopError::Desktop {
        message: format!("Failed to open log file {}: {e}", log_file_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, tag, record.level(), message, record)
        })
        .chain(log_file);

    Dispatch::new()
        .level(LOG_LEVEL)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| DesktopError::Desktop {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
