use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum InstanceError {
    /// Another controller owns the lock. Callers exit cooperatively (code 0).
    #[error("Already Running: {name} {location}")]
    AlreadyRunning {
        name: String,
        location: ErrorLocation,
    },

    #[error("Instance Lock Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for InstanceError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        InstanceError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
