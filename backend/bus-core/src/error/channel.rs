use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ChannelError {
    /// No peer is attached and the pending policy refuses to buffer.
    #[error("Disconnected Error: {message} {location}")]
    Disconnected {
        message: String,
        location: ErrorLocation,
    },

    /// The channel has sent or received `quit`, or was closed explicitly.
    #[error("Channel Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },

    /// A second peer tried to attach while one is connected.
    #[error("Already Connected Error: {message} {location}")]
    AlreadyConnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for ChannelError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        ChannelError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
