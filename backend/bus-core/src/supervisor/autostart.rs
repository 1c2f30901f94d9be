//! Autostart service registration.
//!
//! Registration itself is done by an elevated helper (`ddservice -i` / `-u`), which
//! completes asynchronously; callers confirm by re-querying after a settle delay.

use crate::error::spawn::SpawnError;
use crate::supervisor::ProcessSupervisor;

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

pub const AUTOSTART_SERVICE_NAME: &str = "ddassvc";
pub const AUTOSTART_HELPER_EXECUTABLE: &str = "ddservice";
pub const AUTOSTART_SETTLE_DELAY: Duration = Duration::from_millis(2500);

const INSTALL_FLAG: &str = "-i";
const UNINSTALL_FLAG: &str = "-u";

#[cfg(windows)]
pub(crate) fn is_registered(service_name: &str) -> bool {
    use windows_sys::Win32::System::Services::{
        CloseServiceHandle, OpenSCManagerW, OpenServiceW, SC_MANAGER_CONNECT, SERVICE_QUERY_STATUS,
    };

    let name: Vec<u16> = service_name.encode_utf16().chain(std::iter::once(0)).collect();

    unsafe {
        let manager = OpenSCManagerW(std::ptr::null(), std::ptr::null(), SC_MANAGER_CONNECT);
        if manager.is_null() {
            warn!("OpenSCManagerW failed: {}", std::io::Error::last_os_error());
            return false;
        }

        let service = OpenServiceW(manager, name.as_ptr(), SERVICE_QUERY_STATUS);
        let registered = !service.is_null();
        if registered {
            CloseServiceHandle(service);
        }
        CloseServiceHandle(manager);

        debug!("Service '{service_name}' registered: {registered}");
        registered
    }
}

#[cfg(not(windows))]
pub(crate) fn is_registered(service_name: &str) -> bool {
    let registered = dirs::config_dir()
        .map(|dir| {
            dir.join("systemd")
                .join("user")
                .join(format!("{service_name}.service"))
                .is_file()
        })
        .unwrap_or(false);

    debug!("User unit '{service_name}' registered: {registered}");
    registered
}

/// Install or remove the autostart service through the elevated helper, then confirm.
///
/// # Returns
///
/// The registration state observed after the settle delay. It can differ from
/// `enable` when the user declined elevation.
pub async fn set_autostart<S: ProcessSupervisor>(
    supervisor: &S,
    helper: &Path,
    enable: bool,
    settle_delay: Duration,
) -> Result<bool, SpawnError> {
    let flag = if enable { INSTALL_FLAG } else { UNINSTALL_FLAG };
    info!("Requesting autostart {}", if enable { "install" } else { "removal" });

    supervisor
        .spawn_elevated(helper, &[flag.to_string()])
        .await?;

    let registered = supervisor
        .confirm_autostart(AUTOSTART_SERVICE_NAME, settle_delay)
        .await;

    if registered != enable {
        warn!("Autostart registration is {registered} after request for {enable}");
    }

    Ok(registered)
}
