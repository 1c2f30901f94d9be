use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Rejections raised while building or decoding a [`crate::Command`].
///
/// Both variants are the "malformed command" class: the receiver logs and drops the
/// command, it never tears the session down.
#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("Unknown Command Error: '{name}' {location}")]
    UnknownName {
        name: String,
        location: ErrorLocation,
    },

    #[error("Payload Mismatch Error: {message} {location}")]
    PayloadMismatch {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Value Error: {message} {location}")]
    InvalidValue {
        message: String,
        location: ErrorLocation,
    },
}
