use crate::{EXIT_UNSUPPORTED_OS, EXIT_WORKER_FAILED};

use bus_core::error::CoreError;
use common::ErrorLocation;

use thiserror::Error;

/// Startup and shutdown failures of the launcher and player binaries.
#[derive(Debug, Error)]
pub enum DesktopError {
    /// Error from this app (logger, paths, runtime)
    #[error("Desktop Error: {message} {location}")]
    Desktop {
        message: String,
        location: ErrorLocation,
    },

    /// The OS is too old to run the player
    #[error("Unsupported OS Error: {message} {location}")]
    UnsupportedOs {
        message: String,
        location: ErrorLocation,
    },

    /// The worker could not be started or never connected
    #[error("Worker Error: {message} {location}")]
    Worker {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bus-core operations (instance lock, spawn, channel, settings)
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DesktopError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DesktopError::UnsupportedOs { .. } => EXIT_UNSUPPORTED_OS,
            _ => EXIT_WORKER_FAILED,
        }
    }
}
