//! Where the apps keep their files.
//!
//! - Settings: `<config_dir>/dynamic-desktop/settings.json`
//! - Logs: `<data_local_dir>/dynamic-desktop/logs/{launcher,player}.log`
//!
//! Both fall back to the system temp directory when the platform reports no such dir.

use bus_core::settings::{APP_DIR_NAME, default_settings_dir};

use std::path::PathBuf;

const LOG_DIR_NAME: &str = "logs";

pub fn settings_dir() -> PathBuf {
    default_settings_dir().unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME))
}

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(LOG_DIR_NAME)
}
