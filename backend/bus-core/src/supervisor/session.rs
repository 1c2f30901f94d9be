//! Launching the worker into the interactive console session.
//!
//! A launcher started by a service runs in session 0, which has no desktop. The worker
//! must instead run as the logged-on user: query that user's token, duplicate it as a
//! primary token, build the user's environment block and create the process on the
//! `winsta0\default` desktop. Every handle and the environment block are owned by
//! guards so each early return releases them.

use crate::error::spawn::SpawnError;

use common::ErrorLocation;

use std::ffi::c_void;
use std::mem::{size_of, zeroed};
use std::panic::Location;
use std::path::Path;
use std::ptr::{null, null_mut};

use log::debug;
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::Security::{
    DuplicateTokenEx, SecurityIdentification, TOKEN_ALL_ACCESS, TokenPrimary,
};
use windows_sys::Win32::System::Environment::{CreateEnvironmentBlock, DestroyEnvironmentBlock};
use windows_sys::Win32::System::RemoteDesktop::{
    ProcessIdToSessionId, WTSGetActiveConsoleSessionId, WTSQueryUserToken,
};
use windows_sys::Win32::System::Threading::{
    CREATE_NEW_CONSOLE, CREATE_UNICODE_ENVIRONMENT, CreateProcessAsUserW, GetCurrentProcessId,
    NORMAL_PRIORITY_CLASS, PROCESS_INFORMATION, STARTUPINFOW,
};

const NO_CONSOLE_SESSION: u32 = 0xFFFF_FFFF;
const INTERACTIVE_DESKTOP: &str = "winsta0\\default";

struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CloseHandle(self.0) };
        }
    }
}

struct EnvironmentBlock(*mut c_void);

impl Drop for EnvironmentBlock {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { DestroyEnvironmentBlock(self.0) };
        }
    }
}

fn wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

#[track_caller]
fn session_error(step: &str) -> SpawnError {
    SpawnError::SessionMismatch {
        message: format!("{step} failed: {}", std::io::Error::last_os_error()),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Whether this process runs in a session other than the active console session.
pub(crate) fn caller_outside_console_session() -> bool {
    let console = unsafe { WTSGetActiveConsoleSessionId() };
    if console == NO_CONSOLE_SESSION {
        return false;
    }

    let mut current = 0u32;
    let ok = unsafe { ProcessIdToSessionId(GetCurrentProcessId(), &mut current) };
    if ok == 0 {
        return false;
    }

    debug!("Current session {current}, console session {console}");
    current != console
}

fn command_line(executable: &Path, args: &[String]) -> String {
    let mut line = format!("\"{}\"", executable.display());
    for arg in args {
        if arg.contains(' ') {
            line.push_str(&format!(" \"{arg}\""));
        } else {
            line.push(' ');
            line.push_str(arg);
        }
    }
    line
}

/// Create the process as the console user. Returns the new process id.
pub(crate) fn spawn_in_console_session(
    executable: &Path,
    args: &[String],
) -> Result<u32, SpawnError> {
    let session_id = unsafe { WTSGetActiveConsoleSessionId() };
    if session_id == NO_CONSOLE_SESSION {
        return Err(SpawnError::SessionMismatch {
            message: "No active console session".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut raw_user_token: HANDLE = null_mut();
    if unsafe { WTSQueryUserToken(session_id, &mut raw_user_token) } == 0 {
        return Err(session_error("WTSQueryUserToken"));
    }
    let user_token = OwnedHandle(raw_user_token);

    let mut raw_primary_token: HANDLE = null_mut();
    let duplicated = unsafe {
        DuplicateTokenEx(
            user_token.0,
            TOKEN_ALL_ACCESS,
            null(),
            SecurityIdentification,
            TokenPrimary,
            &mut raw_primary_token,
        )
    };
    if duplicated == 0 {
        return Err(session_error("DuplicateTokenEx"));
    }
    let primary_token = OwnedHandle(raw_primary_token);

    let mut raw_environment: *mut c_void = null_mut();
    if unsafe { CreateEnvironmentBlock(&mut raw_environment, primary_token.0, 0) } == 0 {
        return Err(session_error("CreateEnvironmentBlock"));
    }
    let environment = EnvironmentBlock(raw_environment);

    let mut command = wide(&command_line(executable, args));
    let mut desktop = wide(INTERACTIVE_DESKTOP);
    let directory = executable
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(|d| wide(&d.to_string_lossy()));

    let mut startup: STARTUPINFOW = unsafe { zeroed() };
    startup.cb = size_of::<STARTUPINFOW>() as u32;
    startup.lpDesktop = desktop.as_mut_ptr();

    let mut process_info: PROCESS_INFORMATION = unsafe { zeroed() };

    let created = unsafe {
        CreateProcessAsUserW(
            primary_token.0,
            null(),
            command.as_mut_ptr(),
            null(),
            null(),
            0,
            NORMAL_PRIORITY_CLASS | CREATE_NEW_CONSOLE | CREATE_UNICODE_ENVIRONMENT,
            environment.0,
            directory.as_ref().map_or(null(), |d| d.as_ptr()),
            &startup,
            &mut process_info,
        )
    };
    if created == 0 {
        return Err(session_error("CreateProcessAsUserW"));
    }

    let _process = OwnedHandle(process_info.hProcess);
    let _thread = OwnedHandle(process_info.hThread);

    debug!(
        "CreateProcessAsUserW started PID {} in session {session_id}",
        process_info.dwProcessId
    );
    Ok(process_info.dwProcessId)
}
