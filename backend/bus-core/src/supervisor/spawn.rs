use crate::error::spawn::SpawnError;
use crate::supervisor::WORKER_EXECUTABLE;
use crate::supervisor::handle::ProcessHandle;

use common::{ErrorLocation, executable_file_name};

use std::env::current_exe;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info};
use tokio::process::Command as TokioCommand;

/// Path of the worker executable, expected next to the running executable.
///
/// # Errors
///
/// Returns [`SpawnError::NotFound`] if the file does not exist.
#[track_caller]
pub fn resolve_worker_executable() -> Result<PathBuf, SpawnError> {
    resolve_sibling_executable(WORKER_EXECUTABLE)
}

/// Path of the executable `stem` in the running executable's directory.
#[track_caller]
pub fn resolve_sibling_executable(stem: &str) -> Result<PathBuf, SpawnError> {
    let exe = current_exe().map_err(|e| SpawnError::Spawn {
        message: format!("Failed to get current executable path: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })?;

    let dir = exe.parent().ok_or_else(|| SpawnError::Spawn {
        message: format!("Executable has no parent directory: {}", exe.display()),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::NotFound, "no parent dir")),
    })?;

    let sibling = dir.join(executable_file_name(stem));
    if !sibling.is_file() {
        return Err(SpawnError::NotFound {
            path: sibling,
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(sibling)
}

pub(crate) fn image_name_of(executable: &Path) -> String {
    executable
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub(crate) fn build_spawn_command(executable: &Path, args: &[String]) -> TokioCommand {
    let mut cmd = TokioCommand::new(executable);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }

    cmd
}

/// Start `executable` as a child of this process, or in the active console session
/// when this process runs in another session (Windows services).
pub(crate) async fn spawn_process(
    executable: &Path,
    args: &[String],
) -> Result<ProcessHandle, SpawnError> {
    if !executable.is_file() {
        return Err(SpawnError::NotFound {
            path: executable.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let image_name = image_name_of(executable);

    #[cfg(windows)]
    if crate::supervisor::session::caller_outside_console_session() {
        info!("Caller is outside the console session, launching {image_name} in the user session");
        let owned_executable = executable.to_path_buf();
        let owned_args = args.to_vec();
        let pid = tokio::task::spawn_blocking(move || {
            crate::supervisor::session::spawn_in_console_session(&owned_executable, &owned_args)
        })
        .await
        .map_err(|e| SpawnError::Spawn {
            message: format!("Session spawn task failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })??;

        info!("Spawned {image_name} in console session (PID: {pid})");
        return Ok(ProcessHandle::from_pid(pid, image_name));
    }

    debug!("Spawning {} {:?}", executable.display(), args);

    let child = build_spawn_command(executable, args)
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => SpawnError::NotFound {
                path: executable.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            },
            _ => SpawnError::Spawn {
                message: format!("Failed to spawn {}: {e}", executable.display()),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            },
        })?;

    let handle = ProcessHandle::from_child(child, image_name);
    info!("Spawned {} (PID: {})", handle.image_name(), handle.pid());
    Ok(handle)
}
