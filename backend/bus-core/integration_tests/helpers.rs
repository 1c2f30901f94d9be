//! Test helpers for command bus integration tests:
//! - Paired channels over an in-memory duplex stream
//! - A worker event loop driving a scripted player
//! - Bounded waits on inboxes

use bus_core::channel::{ChannelConfig, CommandChannel, Inbox};
use bus_core::router::Flow;
use bus_core::router::player::{LoadId, MediaTracks, Player, PlayerEvent, PlayerOption};
use bus_core::router::worker::WorkerRouter;

use models::{Command, Endpoint, TrackInfo, TrackKind};

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

pub fn controller_channel() -> (CommandChannel, Inbox) {
    CommandChannel::new(Endpoint::Controller, ChannelConfig::default())
}

pub fn worker_channel() -> (CommandChannel, Inbox) {
    CommandChannel::new(Endpoint::Worker, ChannelConfig::default())
}

/// Attach both channels to the two ends of one in-memory stream.
pub fn connect_pair(controller: &CommandChannel, worker: &CommandChannel) {
    let (controller_end, worker_end) = tokio::io::duplex(64 * 1024);
    controller
        .attach(controller_end)
        .expect("Controller attach should succeed");
    worker
        .attach(worker_end)
        .expect("Worker attach should succeed");
}

pub async fn recv(inbox: &mut Inbox) -> Command {
    tokio::time::timeout(RECV_TIMEOUT, inbox.recv())
        .await
        .expect("Timed out waiting for a command")
        .expect("Inbox closed")
}

/// `true` if nothing arrives within [`QUIET_PERIOD`].
pub async fn stays_empty(inbox: &mut Inbox) -> bool {
    tokio::time::timeout(QUIET_PERIOD, inbox.recv())
        .await
        .is_err()
}

/// Player that reports ready right after `load`, with a fixed duration.
pub struct ScriptedPlayer {
    events: mpsc::UnboundedSender<PlayerEvent>,
    duration_ms: i64,
    pub volume: Option<u32>,
}

impl ScriptedPlayer {
    pub fn new(duration_ms: i64) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                events,
                duration_ms,
                volume: None,
            },
            receiver,
        )
    }
}

impl Player for ScriptedPlayer {
    fn load(&mut self, url: &str, load: LoadId) {
        let _ = self.events.send(PlayerEvent::Ready {
            load,
            duration_ms: self.duration_ms,
            tracks: MediaTracks {
                video: vec![TrackInfo::new(0, "und", url)],
                ..MediaTracks::default()
            },
        });
    }

    fn resume(&mut self) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {}

    fn seek(&mut self, _position_ms: i64) {}

    fn set_volume(&mut self, volume: u32) {
        self.volume = Some(volume);
    }

    fn set_mute(&mut self, _mute: bool) {}

    fn select_track(&mut self, _kind: TrackKind, _id: u32) {}

    fn load_external(&mut self, _kind: TrackKind, _path: &str) {}

    fn apply_option(&mut self, _option: &PlayerOption) {}
}

/// Run the worker side until it handles `quit`, then hand the router back.
pub fn spawn_worker(
    channel: CommandChannel,
    mut inbox: Inbox,
    duration_ms: i64,
) -> JoinHandle<WorkerRouter<ScriptedPlayer, CommandChannel>> {
    tokio::spawn(async move {
        let (player, mut events) = ScriptedPlayer::new(duration_ms);
        let mut router = WorkerRouter::new(player, channel.clone());

        loop {
            let flow = tokio::select! {
                command = inbox.recv() => match command {
                    Some(command) => router.handle(command),
                    None => Flow::Quit,
                },
                Some(event) = events.recv() => router.on_player_event(event),
            };

            if flow == Flow::Quit {
                break;
            }
        }

        channel.close();
        router
    })
}
