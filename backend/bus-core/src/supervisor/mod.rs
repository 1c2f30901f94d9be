//! Worker process lifecycle: spawning, liveness, termination and autostart queries.
//!
//! Platform specifics sit behind the [`ProcessSupervisor`] trait so routers and the
//! channel never see them. [`SystemSupervisor`] is the production implementation.

pub mod autostart;
pub mod elevate;
pub mod handle;
pub mod process;
#[cfg(windows)]
mod session;
pub mod spawn;

pub use handle::ProcessHandle;

use crate::error::spawn::SpawnError;

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use log::{debug, warn};

/// Executable stem of the worker, resolved next to the launcher.
pub const WORKER_EXECUTABLE: &str = "player";

/// Flag telling the worker it was started by the launcher.
pub const RUN_FROM_LAUNCHER_FLAG: &str = "--runfromlauncher";

/// Operations the controller needs from the OS to manage its worker.
pub trait ProcessSupervisor: Send + Sync {
    /// Start `executable` with `args`, working directory set to its parent.
    ///
    /// On Windows the process is placed in the active console session when the caller
    /// runs in a different one.
    fn spawn(
        &self,
        executable: &Path,
        args: &[String],
    ) -> impl Future<Output = Result<ProcessHandle, SpawnError>> + Send;

    /// Run a one-shot helper with elevated privileges. Never waited on.
    fn spawn_elevated(
        &self,
        executable: &Path,
        args: &[String],
    ) -> impl Future<Output = Result<(), SpawnError>> + Send;

    /// Kill the first process whose image name matches exactly, then wait for it to go away.
    ///
    /// Returns `false` when no process matched. Absence is not an error.
    fn terminate_by_name(&self, image_name: &str) -> impl Future<Output = bool> + Send;

    fn is_autostart_registered(&self, service_name: &str) -> bool;

    /// Re-query autostart registration after `delay`, since registration by the
    /// elevated helper completes asynchronously.
    fn confirm_autostart(
        &self,
        service_name: &str,
        delay: Duration,
    ) -> impl Future<Output = bool> + Send {
        async move {
            debug!("Re-checking autostart registration of '{service_name}' in {delay:?}");
            tokio::time::sleep(delay).await;
            self.is_autostart_registered(service_name)
        }
    }
}

/// Production supervisor backed by tokio processes, sysinfo and the Win32 APIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSupervisor;

impl ProcessSupervisor for SystemSupervisor {
    async fn spawn(&self, executable: &Path, args: &[String]) -> Result<ProcessHandle, SpawnError> {
        spawn::spawn_process(executable, args).await
    }

    async fn spawn_elevated(&self, executable: &Path, args: &[String]) -> Result<(), SpawnError> {
        elevate::spawn_elevated(executable, args).await
    }

    async fn terminate_by_name(&self, image_name: &str) -> bool {
        // Process enumeration and the kill-verify backoff both block.
        let owned_name = image_name.to_string();
        tokio::task::spawn_blocking(move || process::terminate_by_name(&owned_name))
            .await
            .unwrap_or_else(|e| {
                warn!("Terminate task for '{image_name}' failed: {e}");
                false
            })
    }

    fn is_autostart_registered(&self, service_name: &str) -> bool {
        autostart::is_registered(service_name)
    }
}
