use crate::error::instance::InstanceError;

use common::ErrorLocation;

use std::io::ErrorKind;
use std::os::unix::net::UnixListener;
use std::panic::Location;

#[cfg(not(target_os = "linux"))]
use std::path::PathBuf;

#[cfg(target_os = "linux")]
#[derive(Debug)]
pub(super) struct PlatformLock {
    _listener: UnixListener,
}

#[cfg(target_os = "linux")]
impl PlatformLock {
    #[track_caller]
    pub(super) fn acquire(name: &str) -> Result<Self, InstanceError> {
        use std::os::linux::net::SocketAddrExt;
        use std::os::unix::net::SocketAddr;

        let address = SocketAddr::from_abstract_name(name.as_bytes())?;

        match UnixListener::bind_addr(&address) {
            Ok(listener) => Ok(Self {
                _listener: listener,
            }),
            Err(e) if e.kind() == ErrorKind::AddrInUse => Err(InstanceError::AlreadyRunning {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(e) => Err(InstanceError::Io {
                message: format!("Failed to bind instance socket '{name}': {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub(super) struct PlatformLock {
    _listener: UnixListener,
    path: PathBuf,
}

#[cfg(not(target_os = "linux"))]
impl PlatformLock {
    #[track_caller]
    pub(super) fn acquire(name: &str) -> Result<Self, InstanceError> {
        use log::warn;
        use std::os::unix::net::UnixStream;

        let path = std::env::temp_dir().join(format!("{name}.lock"));

        match UnixListener::bind(&path) {
            Ok(listener) => return Ok(Self { _listener: listener, path }),
            Err(e) if e.kind() != ErrorKind::AddrInUse => {
                return Err(InstanceError::Io {
                    message: format!("Failed to bind {}: {e}", path.display()),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(_) => {}
        }

        if UnixStream::connect(&path).is_ok() {
            return Err(InstanceError::AlreadyRunning {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        warn!("Removing stale instance socket {}", path.display());
        std::fs::remove_file(&path)?;

        let listener = UnixListener::bind(&path)?;
        Ok(Self { _listener: listener, path })
    }
}

#[cfg(not(target_os = "linux"))]
impl Drop for PlatformLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
