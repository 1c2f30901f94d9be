//! Local byte-stream transport for the command bus.
//!
//! - **Unix**: a domain socket at `<temp_dir>/<name>.sock`; a stale file left by a
//!   crashed launcher is removed before binding
//! - **Windows**: a named pipe `\\.\pipe\<name>`
//!
//! The controller owns the listener and [`serve`]s it; the worker dials with
//! [`connect_with_backoff`].

use crate::channel::CommandChannel;
use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace, warn};
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);
const CONNECT_INITIAL_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(unix)]
pub type ServerStream = tokio::net::UnixStream;
#[cfg(unix)]
pub type ClientStream = tokio::net::UnixStream;

#[cfg(windows)]
pub type ServerStream = tokio::net::windows::named_pipe::NamedPipeServer;
#[cfg(windows)]
pub type ClientStream = tokio::net::windows::named_pipe::NamedPipeClient;

#[cfg(unix)]
pub fn bus_address(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("{name}.sock"))
        .to_string_lossy()
        .to_string()
}

#[cfg(windows)]
pub fn bus_address(name: &str) -> String {
    format!(r"\\.\pipe\{name}")
}

/// Controller-side listener for worker connections.
pub struct LocalListener {
    address: String,
    #[cfg(unix)]
    listener: tokio::net::UnixListener,
    #[cfg(windows)]
    next: tokio::net::windows::named_pipe::NamedPipeServer,
}

impl LocalListener {
    /// Bind the bus `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Io`] if the socket or pipe cannot be created.
    #[cfg(unix)]
    #[track_caller]
    pub fn bind(name: &str) -> Result<Self, ChannelError> {
        let address = bus_address(name);

        if std::path::Path::new(&address).exists() {
            debug!("Removing stale bus socket {address}");
            std::fs::remove_file(&address)?;
        }

        let listener = tokio::net::UnixListener::bind(&address).map_err(|e| ChannelError::Io {
            message: format!("Failed to bind {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("Command bus listening on {address}");
        Ok(Self { address, listener })
    }

    #[cfg(windows)]
    #[track_caller]
    pub fn bind(name: &str) -> Result<Self, ChannelError> {
        use tokio::net::windows::named_pipe::ServerOptions;

        let address = bus_address(name);
        let next = ServerOptions::new()
            .first_pipe_instance(true)
            .create(&address)
            .map_err(|e| ChannelError::Io {
                message: format!("Failed to create pipe {address}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Command bus listening on {address}");
        Ok(Self { address, next })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    #[cfg(unix)]
    pub async fn accept(&mut self) -> Result<ServerStream, ChannelError> {
        let (stream, _) = self.listener.accept().await?;
        Ok(stream)
    }

    #[cfg(windows)]
    pub async fn accept(&mut self) -> Result<ServerStream, ChannelError> {
        use tokio::net::windows::named_pipe::ServerOptions;

        self.next.connect().await?;
        let replacement = ServerOptions::new().create(&self.address)?;
        Ok(std::mem::replace(&mut self.next, replacement))
    }
}

#[cfg(unix)]
impl Drop for LocalListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.address);
    }
}

/// Dial the bus `name` once.
#[cfg(unix)]
pub async fn connect(name: &str) -> Result<ClientStream, ChannelError> {
    let address = bus_address(name);
    tokio::net::UnixStream::connect(&address)
        .await
        .map_err(|e| ChannelError::Connect {
            message: format!("Failed to connect to {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[cfg(windows)]
pub async fn connect(name: &str) -> Result<ClientStream, ChannelError> {
    use tokio::net::windows::named_pipe::ClientOptions;

    let address = bus_address(name);
    ClientOptions::new()
        .open(&address)
        .map_err(|e| ChannelError::Connect {
            message: format!("Failed to open pipe {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Dial the bus and attach the stream, retrying with exponential backoff for `budget`.
///
/// # Errors
///
/// Returns [`ChannelError::Connect`] once the budget is exhausted.
pub async fn connect_with_backoff(
    channel: &CommandChannel,
    name: &str,
    budget: Duration,
) -> Result<(), ChannelError> {
    let mut backoff = ExponentialBackoff {
        initial_interval: CONNECT_INITIAL_INTERVAL,
        max_elapsed_time: Some(budget),
        ..Default::default()
    };

    channel.mark_connecting();
    debug!("Connecting to command bus '{name}'");

    loop {
        match connect(name).await {
            Ok(stream) => {
                channel.attach(stream)?;
                info!("Connected to command bus '{name}'");
                return Ok(());
            }
            Err(e) => match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Bus not ready ({e}), retrying after {duration:?}");
                    TokioSleep(duration).await;
                }
                None => {
                    channel.mark_disconnected();
                    return Err(ChannelError::Connect {
                        message: format!("Command bus '{name}' unreachable within {budget:?}: {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
        }
    }
}

/// Accept workers on `listener` and attach them to `channel` until it is closed.
///
/// Only one worker is attached at a time; a second concurrent connection is dropped.
pub fn serve(channel: CommandChannel, mut listener: LocalListener) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let accepted = tokio::select! {
                _ = channel.closed() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok(stream) => match channel.attach(stream) {
                    Ok(()) => info!("Worker attached on {}", listener.address()),
                    Err(ChannelError::AlreadyConnected { .. }) => {
                        warn!("Rejecting second worker connection on {}", listener.address());
                    }
                    Err(ChannelError::Closed { .. }) => break,
                    Err(e) => warn!("Failed to attach worker: {e}"),
                },
                Err(e) => {
                    warn!("Accept failed on {}: {e}", listener.address());
                    TokioSleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }

        debug!("Stopped accepting on {}", listener.address());
    })
}
