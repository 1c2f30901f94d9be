// Library exports for testing
// The launcher and player binaries are thin wrappers around `launcher::run` and `player::run`

pub mod console;
pub mod error;
pub mod headless;
pub mod launcher;
pub mod logger;
pub mod paths;
pub mod player;

#[cfg(test)]
mod tests;

/// Normal exit, including "another launcher is already running".
pub const EXIT_OK: i32 = 0;

/// The OS is older than Windows 7 (build 7600).
pub const EXIT_UNSUPPORTED_OS: i32 = -1;

/// The player is missing, failed to start or never connected.
pub const EXIT_WORKER_FAILED: i32 = -2;
