//! Domain models for Dynamic Desktop.
//!
//! Pure data exchanged between the launcher (controller) and the player (worker):
//! the command vocabulary, typed payloads, track descriptors, playback options and
//! the protobuf messages that carry them over the wire. No I/O lives here.

pub mod command;
pub mod error;
pub mod options;
pub mod payload;
pub mod player_state;
pub mod session;
pub mod track;
pub mod wire;

pub use command::{Command, CommandName, Direction};
pub use error::model_error::ModelError;
pub use options::{ImageQuality, MAX_VOLUME, Renderer};
pub use payload::{PayloadKind, PayloadShape, TypedPayload};
pub use player_state::PlayerState;
pub use session::{Endpoint, SessionState};
pub use track::{TrackInfo, TrackKind};
pub use wire::{WireCommand, WireStringList};

#[cfg(test)]
mod tests;
