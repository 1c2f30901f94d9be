//! Test helpers for driving the player event loop against an in-memory launcher.

use bus_core::channel::{ChannelConfig, CommandChannel, Inbox};
use bus_core::router::worker::WorkerRouter;

use dynamic_desktop::headless::HeadlessPlayer;
use dynamic_desktop::player::event_loop;

use models::{Command, Endpoint};

use std::time::Duration;

use tokio::task::JoinHandle;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub type PlayerTask = JoinHandle<WorkerRouter<HeadlessPlayer, CommandChannel>>;

/// Start the player loop on a worker channel attached to `worker_end`.
pub fn spawn_player<S>(worker_end: S) -> PlayerTask
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Send + Unpin + 'static,
{
    let (channel, inbox) = CommandChannel::new(Endpoint::Worker, ChannelConfig::default());
    channel
        .attach(worker_end)
        .expect("Worker attach should succeed");

    let (player, events) = HeadlessPlayer::new();
    let router = WorkerRouter::new(player, channel.clone());

    tokio::spawn(async move { event_loop(router, &channel, inbox, events).await })
}

/// A launcher-side channel plus a running player connected to it.
pub fn launcher_with_player() -> (CommandChannel, Inbox, PlayerTask) {
    let (launcher, inbox) = CommandChannel::new(Endpoint::Controller, ChannelConfig::default());
    let (launcher_end, worker_end) = tokio::io::duplex(64 * 1024);
    launcher
        .attach(launcher_end)
        .expect("Controller attach should succeed");

    (launcher, inbox, spawn_player(worker_end))
}

pub async fn recv(inbox: &mut Inbox) -> Command {
    tokio::time::timeout(RECV_TIMEOUT, inbox.recv())
        .await
        .expect("Timed out waiting for a command")
        .expect("Inbox closed")
}

pub async fn finished(task: PlayerTask) -> WorkerRouter<HeadlessPlayer, CommandChannel> {
    tokio::time::timeout(RECV_TIMEOUT, task)
        .await
        .expect("Player loop should end")
        .expect("Player loop should not panic")
}
