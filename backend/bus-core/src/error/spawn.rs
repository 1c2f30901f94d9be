use common::ErrorLocation;

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SpawnError {
    #[error("Executable Not Found: {path} {location}")]
    NotFound {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Launching into the interactive user session failed at the named step.
    #[error("Session Mismatch Error: {message} {location}")]
    SessionMismatch {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },
}
