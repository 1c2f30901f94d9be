use crate::error::instance::InstanceError;

use common::ErrorLocation;

use std::panic::Location;

use windows_sys::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE};
use windows_sys::Win32::System::Threading::{CreateMutexW, ReleaseMutex};

#[derive(Debug)]
pub(super) struct PlatformLock {
    handle: HANDLE,
}

// The mutex handle is only touched again in Drop.
unsafe impl Send for PlatformLock {}
unsafe impl Sync for PlatformLock {}

impl PlatformLock {
    #[track_caller]
    pub(super) fn acquire(name: &str) -> Result<Self, InstanceError> {
        let wide: Vec<u16> = format!("Global\\{name}")
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        let handle = unsafe { CreateMutexW(std::ptr::null(), 1, wide.as_ptr()) };
        let last_error = unsafe { GetLastError() };

        if handle.is_null() {
            return Err(InstanceError::Io {
                message: format!("CreateMutexW failed for '{name}' (error {last_error})"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if last_error == ERROR_ALREADY_EXISTS {
            unsafe { CloseHandle(handle) };
            return Err(InstanceError::AlreadyRunning {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { handle })
    }
}

impl Drop for PlatformLock {
    fn drop(&mut self) {
        unsafe {
            ReleaseMutex(self.handle);
            CloseHandle(self.handle);
        }
    }
}
