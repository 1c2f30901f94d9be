//! Command dispatch on each side of the bus.
//!
//! - [`worker::WorkerRouter`] owns the [`models::PlayerState`] machine and drives a
//!   [`player::Player`]
//! - [`controller::ControllerRouter`] renders worker status into a [`controller::UiState`]
//!   and turns user actions into commands, persisting preferences first
//!
//! Both emit through a [`CommandSink`], which the [`crate::channel::CommandChannel`]
//! implements, so routers are testable without a transport.

pub mod controller;
pub mod player;
pub mod worker;

use crate::channel::CommandChannel;

use models::Command;

use log::warn;

/// Whether the owning event loop keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Destination for commands a router emits.
pub trait CommandSink {
    fn emit(&self, command: Command);
}

impl CommandSink for CommandChannel {
    fn emit(&self, command: Command) {
        if let Err(e) = self.send(command) {
            warn!("Command not sent: {e}");
        }
    }
}
