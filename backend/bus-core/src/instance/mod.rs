//! System-wide single-instance lock for the controller process.
//!
//! The OS arbitrates ownership, so two near-simultaneous launches cannot both win:
//! - **Windows**: a named mutex (`Global\<name>`), owned by the creating process
//! - **Linux**: a Unix socket bound in the abstract namespace, released by the kernel
//!   when the owning process dies for any reason
//! - **Other Unix**: a socket file in the temp directory, reclaimed only when no live
//!   owner accepts a connection on it
//!
//! The lock is released exactly once, when [`InstanceLock`] is dropped.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix::PlatformLock;
#[cfg(windows)]
use windows::PlatformLock;

use crate::error::instance::InstanceError;

use log::{debug, info};

/// Lock name used by the launcher.
pub const LAUNCHER_INSTANCE_NAME: &str = "DynamicDesktop.Launcher.AppMutex";

/// Proof of single-instance ownership. Hold it for the lifetime of the process.
#[derive(Debug)]
pub struct InstanceLock {
    name: String,
    _platform: PlatformLock,
}

impl InstanceLock {
    /// Acquire the named lock.
    ///
    /// # Errors
    ///
    /// - [`InstanceError::AlreadyRunning`] if another process holds the lock
    /// - [`InstanceError::Io`] if the OS primitive could not be created
    #[track_caller]
    pub fn acquire(name: &str) -> Result<Self, InstanceError> {
        debug!("Acquiring instance lock '{name}'");

        let platform = PlatformLock::acquire(name)?;

        info!("Instance lock '{name}' acquired");
        Ok(Self {
            name: name.to_string(),
            _platform: platform,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        debug!("Releasing instance lock '{}'", self.name);
    }
}
