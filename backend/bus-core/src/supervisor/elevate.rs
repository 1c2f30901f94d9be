use crate::error::spawn::SpawnError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;

use log::info;

/// Launch a one-shot helper with administrator rights.
///
/// Windows prompts through `ShellExecuteExW` with the `runas` verb and a hidden window.
/// Other platforms delegate to `pkexec`. The helper is never waited on.
pub(crate) async fn spawn_elevated(executable: &Path, args: &[String]) -> Result<(), SpawnError> {
    if !executable.is_file() {
        return Err(SpawnError::NotFound {
            path: executable.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    info!("Launching elevated: {} {:?}", executable.display(), args);

    #[cfg(windows)]
    {
        let owned_executable = executable.to_path_buf();
        let owned_args = args.to_vec();
        tokio::task::spawn_blocking(move || shell_execute_runas(&owned_executable, &owned_args))
            .await
            .map_err(|e| SpawnError::Spawn {
                message: format!("Elevation task failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?
    }

    #[cfg(not(windows))]
    {
        use std::process::Stdio;
        use tokio::process::Command as TokioCommand;

        TokioCommand::new("pkexec")
            .arg(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| SpawnError::Spawn {
                message: format!("Failed to run pkexec for {}: {e}", executable.display()),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })
    }
}

#[cfg(windows)]
fn shell_execute_runas(executable: &Path, args: &[String]) -> Result<(), SpawnError> {
    use std::mem::{size_of, zeroed};
    use windows_sys::Win32::UI::Shell::{SHELLEXECUTEINFOW, ShellExecuteExW};
    use windows_sys::Win32::UI::WindowsAndMessaging::SW_HIDE;

    let wide = |s: &str| -> Vec<u16> { s.encode_utf16().chain(std::iter::once(0)).collect() };

    let verb = wide("runas");
    let file = wide(&executable.to_string_lossy());
    let parameters = wide(&args.join(" "));
    let directory = wide(
        &executable
            .parent()
            .map(|d| d.to_string_lossy().to_string())
            .unwrap_or_default(),
    );

    let mut info: SHELLEXECUTEINFOW = unsafe { zeroed() };
    info.cbSize = size_of::<SHELLEXECUTEINFOW>() as u32;
    info.lpVerb = verb.as_ptr();
    info.lpFile = file.as_ptr();
    info.lpParameters = parameters.as_ptr();
    info.lpDirectory = directory.as_ptr();
    info.nShow = SW_HIDE as i32;

    if unsafe { ShellExecuteExW(&mut info) } == 0 {
        let error = std::io::Error::last_os_error();
        return Err(SpawnError::Spawn {
            message: format!("ShellExecuteExW(runas) failed for {}: {error}", executable.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(error),
        });
    }

    Ok(())
}
