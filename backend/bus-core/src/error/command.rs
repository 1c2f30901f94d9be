use common::ErrorLocation;

use models::ModelError;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Malformed command on the wire. Logged and dropped by the reader, never fatal.
#[derive(Debug, ThisError)]
pub enum CommandError {
    #[error(transparent)]
    Malformed(#[from] ModelError),

    #[error("Protobuf Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Protobuf Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },
}

impl From<prost::DecodeError> for CommandError {
    #[track_caller]
    fn from(error: prost::DecodeError) -> Self {
        CommandError::Decode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<prost::EncodeError> for CommandError {
    #[track_caller]
    fn from(error: prost::EncodeError) -> Self {
        CommandError::Encode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
