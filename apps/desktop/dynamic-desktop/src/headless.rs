//! Media engine stand-in for builds without a video backend.
//!
//! Nothing is decoded. Opening media checks that a local file exists, then reports it
//! ready with a nominal length, and a clock task advances the position while playing.

use bus_core::router::player::{LoadId, MediaTracks, Player, PlayerEvent, PlayerOption};

use models::{TrackInfo, TrackKind};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Length reported for every opened media.
pub const NOMINAL_DURATION: Duration = Duration::from_secs(60);

/// Interval between position reports.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct Clock {
    load: LoadId,
    running: bool,
    position_ms: i64,
    duration_ms: i64,
}

pub struct HeadlessPlayer {
    events: mpsc::UnboundedSender<PlayerEvent>,
    clock: Arc<Mutex<Clock>>,
    volume: u32,
    mute: bool,
    external: Vec<(TrackKind, String)>,
}

impl HeadlessPlayer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let player = Self {
            events,
            clock: Arc::new(Mutex::new(Clock::default())),
            volume: 0,
            mute: false,
            external: Vec::new(),
        };
        (player, receiver)
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    pub fn external_files(&self) -> &[(TrackKind, String)] {
        &self.external
    }

    /// Report the position every `tick` while playing, and `Finished` at the end.
    ///
    /// The task stops once the event receiver is dropped.
    pub fn spawn_clock(&self, tick: Duration) -> JoinHandle<()> {
        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();
        let step = i64::try_from(tick.as_millis()).unwrap_or(i64::MAX);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;

            loop {
                interval.tick().await;

                let event = {
                    let mut clock = clock.lock();
                    if !clock.running {
                        continue;
                    }
                    clock.position_ms = clock.position_ms.saturating_add(step).min(clock.duration_ms);
                    if clock.position_ms >= clock.duration_ms {
                        clock.running = false;
                        PlayerEvent::Finished { load: clock.load }
                    } else {
                        PlayerEvent::Position(clock.position_ms)
                    }
                };

                if events.send(event).is_err() {
                    break;
                }
            }
        })
    }

    fn emit(&self, event: PlayerEvent) {
        if self.events.send(event).is_err() {
            debug!("Player event receiver is gone");
        }
    }
}

fn is_remote(url: &str) -> bool {
    url.contains("://")
}

impl Player for HeadlessPlayer {
    fn load(&mut self, url: &str, load: LoadId) {
        self.external.clear();
        {
            let mut clock = self.clock.lock();
            clock.load = load;
            clock.running = false;
        }

        if !is_remote(url) && !Path::new(url).is_file() {
            self.emit(PlayerEvent::Failed {
                load,
                reason: format!("{url}: no such file"),
            });
            return;
        }

        let duration_ms = i64::try_from(NOMINAL_DURATION.as_millis()).unwrap_or(i64::MAX);
        {
            let mut clock = self.clock.lock();
            clock.position_ms = 0;
            clock.duration_ms = duration_ms;
        }

        info!("Opened {url}");
        self.emit(PlayerEvent::Ready {
            load,
            duration_ms,
            tracks: MediaTracks {
                video: vec![TrackInfo::new(0, "und", "Video")],
                audio: vec![TrackInfo::new(1, "und", "Audio")],
                subtitle: Vec::new(),
            },
        });
    }

    fn resume(&mut self) {
        self.clock.lock().running = true;
    }

    fn pause(&mut self) {
        self.clock.lock().running = false;
    }

    fn stop(&mut self) {
        let mut clock = self.clock.lock();
        clock.running = false;
        clock.position_ms = 0;
    }

    fn seek(&mut self, position_ms: i64) {
        self.clock.lock().position_ms = position_ms;
    }

    fn set_volume(&mut self, volume: u32) {
        self.volume = volume;
    }

    fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    fn select_track(&mut self, kind: TrackKind, id: u32) {
        info!("Selected {kind} track {id}");
    }

    fn load_external(&mut self, kind: TrackKind, path: &str) {
        info!("Loaded external {kind} file {path}");
        self.external.push((kind, path.to_string()));
    }

    fn apply_option(&mut self, option: &PlayerOption) {
        debug!("Option {option:?}");
    }
}
