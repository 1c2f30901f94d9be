//! Shared primitives for Dynamic Desktop.
//!
//! ## Architecture
//!
//! - **common** (this crate): error location tracking and platform naming helpers
//! - **models**: command vocabulary and payload types exchanged between processes
//! - **bus-core**: instance lock, command channel, process supervision, routing, settings
//! - **dynamic-desktop**: the launcher and player binaries wiring everything together

pub mod error;
pub mod executable;

pub use error::error_location::ErrorLocation;
pub use executable::executable_file_name;

#[cfg(test)]
mod tests;
