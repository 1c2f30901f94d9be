use std::ffi::OsStr;
use std::thread::sleep;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace};
use sysinfo::{Pid, Process, ProcessesToUpdate, System};

const KILL_VERIFY_MAX_ELAPSED: Duration = Duration::from_secs(2);

pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);

    sys.process(Pid::from_u32(pid)).map(f)
}

/// Kill the first process whose image name equals `image_name`.
///
/// Waits with exponential backoff (up to 2 seconds) for the process to disappear.
///
/// # Returns
///
/// * `true` - A process matched and the kill signal was delivered
/// * `false` - Nothing matched, or the OS refused the kill
pub fn terminate_by_name(image_name: &str) -> bool {
    let mut sys = System::new_all();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let own_pid = std::process::id();
    let target = sys
        .processes_by_exact_name(OsStr::new(image_name))
        .find(|p| p.pid().as_u32() != own_pid)
        .map(|p| (p.pid().as_u32(), p.kill()));

    match target {
        None => {
            debug!("No process named '{image_name}' to terminate");
            false
        }
        Some((pid, false)) => {
            debug!("Kill of '{image_name}' (PID {pid}) was refused");
            false
        }
        Some((pid, true)) => {
            info!("Killed '{image_name}' (PID {pid})");
            wait_for_termination(pid);
            true
        }
    }
}

fn wait_for_termination(pid: u32) {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(KILL_VERIFY_MAX_ELAPSED),
        ..Default::default()
    };

    loop {
        if with_process(pid, |_| true).is_none() {
            debug!("Process {pid} successfully terminated");
            return;
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Process {pid} still alive, retrying after {duration:?}");
                sleep(duration);
            }
            None => {
                debug!("Process {pid} still running after max backoff time");
                return;
            }
        }
    }
}
