pub mod channel;
pub mod cli;
pub mod error;
pub mod instance;
pub mod router;
pub mod settings;
pub mod supervisor;

#[cfg(test)]
mod tests;

use std::time::Duration;

/// How long the controller waits for a freshly spawned worker to connect.
pub const WORKER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time the worker gets to exit after `quit` before it is killed by name.
pub const QUIT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Unexpected worker exits tolerated before the controller gives up.
pub const MAX_WORKER_RESTARTS: u32 = 3;
