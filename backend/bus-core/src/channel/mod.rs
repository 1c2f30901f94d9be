//! Ordered command transport between the controller and the worker.
//!
//! A [`CommandChannel`] outlives individual connections. Commands sent while no peer
//! is attached wait in a bounded pending queue and are flushed, in order, ahead of
//! anything sent after the next [`CommandChannel::attach`].
//!
//! # Architecture
//!
//! - `send` never blocks: it hands the command to the writer task or queues it
//! - Queueing, flushing and handing to the writer happen under one lock, which is what
//!   keeps each direction FIFO
//! - `quit` travels in a priority lane the writer drains first; after it the writer
//!   stops and the channel rejects further sends
//! - The reader task decodes complete frames only, drops malformed ones and delivers
//!   the rest to the inbox in arrival order
//! - Each connection carries a generation number so a stale task tearing down cannot
//!   disconnect its successor

pub mod codec;
pub mod config;
pub(crate) mod pending;
pub mod transport;

pub use config::{ChannelConfig, PendingPolicy};

use crate::channel::pending::PendingQueue;
use crate::error::channel::ChannelError;

use common::ErrorLocation;
use models::{Command, Endpoint, SessionState};

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;

/// Decoded commands from the peer, in arrival order.
pub type Inbox = mpsc::Receiver<Command>;

/// Result of a successful [`CommandChannel::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the writer of the current connection.
    Written,
    /// Buffered until a peer attaches.
    Queued,
}

struct Connection {
    generation: u64,
    normal: mpsc::UnboundedSender<Command>,
    priority: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

struct Outbox {
    connection: Option<Connection>,
    pending: PendingQueue,
    closing: bool,
    generation: u64,
}

struct Shared {
    endpoint: Endpoint,
    config: ChannelConfig,
    outbox: Mutex<Outbox>,
    state: watch::Sender<SessionState>,
    inbox: mpsc::Sender<Command>,
    received_quit: AtomicBool,
    closed: CancellationToken,
}

/// One endpoint of the command bus. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct CommandChannel {
    shared: Arc<Shared>,
}

impl CommandChannel {
    pub fn new(endpoint: Endpoint, config: ChannelConfig) -> (Self, Inbox) {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_capacity.max(1));
        let (state_tx, _) = watch::channel(SessionState::Disconnected);

        let outbox = Outbox {
            connection: None,
            pending: PendingQueue::new(config.pending_capacity),
            closing: false,
            generation: 0,
        };

        let channel = Self {
            shared: Arc::new(Shared {
                endpoint,
                config,
                outbox: Mutex::new(outbox),
                state: state_tx,
                inbox: inbox_tx,
                received_quit: AtomicBool::new(false),
                closed: CancellationToken::new(),
            }),
        };

        (channel, inbox_rx)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.shared.endpoint
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Wait until the session reaches `target`. Returns `false` on timeout.
    pub async fn wait_for(&self, target: SessionState, timeout: Duration) -> bool {
        let mut receiver = self.subscribe();
        tokio::time::timeout(timeout, receiver.wait_for(|state| *state == target))
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false)
    }

    /// `quit` was sent or the channel was closed; sends are rejected.
    pub fn is_closing(&self) -> bool {
        self.shared.outbox.lock().closing
    }

    /// The peer sent `quit`; later frames are dropped.
    pub fn received_quit(&self) -> bool {
        self.shared.received_quit.load(Ordering::SeqCst)
    }

    pub fn pending_len(&self) -> usize {
        self.shared.outbox.lock().pending.len()
    }

    /// Resolves once [`CommandChannel::close`] has been called.
    pub async fn closed(&self) {
        self.shared.closed.cancelled().await
    }

    /// Send `command` to the peer without blocking.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::Closed`] after `quit` or `close()`
    /// - [`ChannelError::Disconnected`] when no peer is attached and the policy is
    ///   [`PendingPolicy::FailFast`]
    #[track_caller]
    pub fn send(&self, command: Command) -> Result<SendOutcome, ChannelError> {
        let endpoint = self.shared.endpoint;
        let mut outbox = self.shared.outbox.lock();

        if outbox.closing {
            return Err(ChannelError::Closed {
                message: format!("[{endpoint}] channel is closing, '{command}' rejected"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if command.is_quit() {
            return Ok(Self::send_quit(endpoint, &mut outbox, command));
        }

        let command = match outbox.connection.as_ref() {
            Some(connection) => match connection.normal.send(command) {
                Ok(()) => {
                    trace!("[{endpoint}] handed command to writer");
                    return Ok(SendOutcome::Written);
                }
                Err(returned) => {
                    debug!("[{endpoint}] writer is gone, treating session as disconnected");
                    returned.0
                }
            },
            None => command,
        };

        match self.shared.config.pending_policy {
            PendingPolicy::FailFast => Err(ChannelError::Disconnected {
                message: format!("[{endpoint}] no peer attached, '{command}' rejected"),
                location: ErrorLocation::from(Location::caller()),
            }),
            PendingPolicy::Buffer => {
                debug!("[{endpoint}] queued '{command}' until a peer attaches");
                if let Some(evicted) = outbox.pending.push(command) {
                    warn!("[{endpoint}] pending queue full, dropped oldest '{evicted}'");
                }
                Ok(SendOutcome::Queued)
            }
        }
    }

    fn send_quit(endpoint: Endpoint, outbox: &mut Outbox, quit: Command) -> SendOutcome {
        outbox.closing = true;

        let discarded = outbox.pending.clear();
        if discarded > 0 {
            info!("[{endpoint}] quit discards {discarded} pending command(s)");
        }

        let quit = match outbox.connection.as_ref() {
            Some(connection) => match connection.priority.send(quit) {
                Ok(()) => {
                    info!("[{endpoint}] quit sent on priority lane");
                    return SendOutcome::Written;
                }
                Err(returned) => returned.0,
            },
            None => quit,
        };

        info!("[{endpoint}] quit queued until a peer attaches");
        outbox.pending.push(quit);
        SendOutcome::Queued
    }

    /// Send a settings sync that must reach the next peer before the queued backlog.
    ///
    /// With a peer attached this is [`CommandChannel::send`] in order. Otherwise the sync is
    /// queued in front of the backlog and replaces queued commands of the same name, so a
    /// `setUrl` already waiting is not loaded a second time. `quit` is never part of a sync
    /// and is skipped.
    ///
    /// # Errors
    ///
    /// Same as [`CommandChannel::send`].
    #[track_caller]
    pub fn resync(&self, commands: Vec<Command>) -> Result<SendOutcome, ChannelError> {
        let endpoint = self.shared.endpoint;
        let mut outbox = self.shared.outbox.lock();

        if outbox.closing {
            return Err(ChannelError::Closed {
                message: format!("[{endpoint}] channel is closing, sync rejected"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let commands: Vec<Command> = commands
            .into_iter()
            .filter(|command| {
                if command.is_quit() {
                    warn!("[{endpoint}] quit is not a sync command, skipped");
                }
                !command.is_quit()
            })
            .collect();

        if outbox.connection.is_some() {
            drop(outbox);
            let mut outcome = SendOutcome::Written;
            for command in commands {
                outcome = self.send(command)?;
            }
            return Ok(outcome);
        }

        if self.shared.config.pending_policy == PendingPolicy::FailFast {
            return Err(ChannelError::Disconnected {
                message: format!("[{endpoint}] no peer attached, sync rejected"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let count = commands.len();
        let dropped = outbox.pending.put_ahead(commands);
        debug!("[{endpoint}] queued {count} sync command(s) ahead of the backlog, dropped {dropped}");
        Ok(SendOutcome::Queued)
    }

    /// Bind a connected byte stream as the current session.
    ///
    /// Pending commands are flushed in order before this returns, ahead of any later send.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::AlreadyConnected`] if a peer is already attached
    /// - [`ChannelError::Closed`] after `close()`
    pub fn attach<S>(&self, stream: S) -> Result<(), ChannelError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let endpoint = self.shared.endpoint;

        if self.shared.closed.is_cancelled() {
            return Err(ChannelError::Closed {
                message: format!("[{endpoint}] cannot attach to a closed channel"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut outbox = self.shared.outbox.lock();

        if outbox.connection.is_some() {
            return Err(ChannelError::AlreadyConnected {
                message: format!("[{endpoint}] a peer is already attached"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        outbox.generation += 1;
        let generation = outbox.generation;
        let cancel = self.shared.closed.child_token();
        let (normal_tx, normal_rx) = mpsc::unbounded_channel();
        let (priority_tx, priority_rx) = mpsc::unbounded_channel();

        let mut flushed = 0usize;
        for command in outbox.pending.drain() {
            let lane = if command.is_quit() { &priority_tx } else { &normal_tx };
            if lane.send(command).is_ok() {
                flushed += 1;
            }
        }

        outbox.connection = Some(Connection {
            generation,
            normal: normal_tx,
            priority: priority_tx,
            cancel: cancel.clone(),
        });
        self.shared.state.send_replace(SessionState::Connected);
        drop(outbox);

        info!("[{endpoint}] session {generation} connected, flushed {flushed} pending command(s)");

        let (read_half, write_half) = tokio::io::split(stream);
        let max_frame_length = self.shared.config.max_frame_length;

        let frames_out = FramedWrite::new(write_half, codec::frame_codec(max_frame_length));
        let frames_in = FramedRead::new(read_half, codec::frame_codec(max_frame_length));

        tokio::spawn(writer_loop(
            Arc::clone(&self.shared),
            frames_out,
            priority_rx,
            normal_rx,
            generation,
            cancel.clone(),
        ));
        tokio::spawn(reader_loop(
            Arc::clone(&self.shared),
            frames_in,
            generation,
            cancel,
        ));

        Ok(())
    }

    /// Mark an outbound connection attempt in progress.
    pub fn mark_connecting(&self) {
        let outbox = self.shared.outbox.lock();
        if outbox.connection.is_none() {
            self.shared.state.send_if_modified(|state| {
                let changed = *state == SessionState::Disconnected;
                if changed {
                    *state = SessionState::Connecting;
                }
                changed
            });
        }
    }

    /// Return to `Disconnected` after a failed connection attempt.
    pub fn mark_disconnected(&self) {
        let outbox = self.shared.outbox.lock();
        if outbox.connection.is_none() {
            self.shared.state.send_replace(SessionState::Disconnected);
        }
    }

    /// Close the channel for good: pending sends are discarded and both tasks stop.
    ///
    /// A `quit` already on the priority lane is still written.
    pub fn close(&self) {
        let endpoint = self.shared.endpoint;
        let mut outbox = self.shared.outbox.lock();

        outbox.closing = true;
        let discarded = outbox.pending.clear();
        outbox.connection = None;
        self.shared.closed.cancel();
        self.shared.state.send_replace(SessionState::Disconnected);

        info!("[{endpoint}] channel closed, discarded {discarded} pending command(s)");
    }

    fn detach(shared: &Shared, generation: u64) {
        let mut outbox = shared.outbox.lock();

        let current = outbox
            .connection
            .as_ref()
            .is_some_and(|connection| connection.generation == generation);

        if current {
            if let Some(connection) = outbox.connection.take() {
                connection.cancel.cancel();
            }
            shared.state.send_replace(SessionState::Disconnected);
            info!("[{}] session {generation} disconnected", shared.endpoint);
        }
    }
}

async fn writer_loop<W>(
    shared: Arc<Shared>,
    mut frames: FramedWrite<W, tokio_util::codec::LengthDelimitedCodec>,
    mut priority: mpsc::UnboundedReceiver<Command>,
    mut normal: mpsc::UnboundedReceiver<Command>,
    generation: u64,
    cancel: CancellationToken,
) where
    W: AsyncWrite + Send + Unpin,
{
    let endpoint = shared.endpoint;
    let mut sequence = 0u64;

    debug!("[{endpoint}] writer {generation} started");

    loop {
        let (command, is_quit) = tokio::select! {
            biased;
            Some(command) = priority.recv() => (command, true),
            _ = cancel.cancelled() => break,
            next = normal.recv() => match next {
                Some(command) => (command, false),
                None => break,
            },
        };

        sequence += 1;
        let frame = match codec::encode_command(&command, sequence) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("[{endpoint}] failed to encode '{command}': {e}");
                continue;
            }
        };

        trace!("[{endpoint}] -> #{sequence} {command}");

        if let Err(e) = frames.send(frame).await {
            warn!("[{endpoint}] write failed: {e}");
            CommandChannel::detach(&shared, generation);
            return;
        }

        if is_quit {
            info!("[{endpoint}] quit written, writer {generation} stopping");
            return;
        }
    }

    debug!("[{endpoint}] writer {generation} stopped");
}

async fn reader_loop<R>(
    shared: Arc<Shared>,
    mut frames: FramedRead<R, tokio_util::codec::LengthDelimitedCodec>,
    generation: u64,
    cancel: CancellationToken,
) where
    R: AsyncRead + Send + Unpin,
{
    let endpoint = shared.endpoint;

    debug!("[{endpoint}] reader {generation} started");

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("[{endpoint}] reader {generation} cancelled");
                return;
            }
            next = frames.next() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                warn!("[{endpoint}] read failed: {e}");
                break;
            }
            None => {
                info!("[{endpoint}] peer closed the connection");
                break;
            }
        };

        let (sequence, command) = match codec::decode_command(&frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("[{endpoint}] dropping malformed command: {e}");
                continue;
            }
        };

        if shared.received_quit.load(Ordering::SeqCst) {
            debug!("[{endpoint}] dropping #{sequence} {command} received after quit");
            continue;
        }

        trace!("[{endpoint}] <- #{sequence} {command}");

        if command.is_quit() {
            info!("[{endpoint}] peer requested quit");
            shared.received_quit.store(true, Ordering::SeqCst);
        }

        if shared.inbox.send(command).await.is_err() {
            debug!("[{endpoint}] inbox dropped, reader {generation} stopping");
            break;
        }
    }

    CommandChannel::detach(&shared, generation);
}
