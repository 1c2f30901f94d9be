//! Worker-side router: the playback state machine.
//!
//! | State | Command | Effect | Next |
//! |---|---|---|---|
//! | any | `setUrl(url)` | release current media, load | `Loading` |
//! | any | `setUrl("")` | same as `stop` | `Stopped` |
//! | `Loading` | ready event | apply volume/mute, report duration and tracks | `Playing` (`Paused` if paused while loading) |
//! | `Playing` | `pause` | pause | `Paused` |
//! | `Paused` | `play` | resume | `Playing` |
//! | `Stopped`/`Error` | `play` | reload the last url | `Loading` |
//! | `Playing`/`Paused`/`Loading` | `stop` | release media | `Stopped` |
//! | `Playing`/`Paused` | `seek(t)` | reposition to `clamp(t, 0, duration)` | unchanged |
//! | any | `setVolume(v)` | remember `clamp(v, 0, 99)`, apply unless `Idle` | unchanged |
//! | any | `quit` | release media | terminal |
//!
//! Anything not in the table is logged and ignored. Engine events from a load that
//! has since been replaced are dropped.

use crate::router::player::{LoadId, MediaTracks, Player, PlayerEvent, PlayerOption};
use crate::router::{CommandSink, Flow};

use models::{
    Command, CommandName, ImageQuality, MAX_VOLUME, PlayerState, Renderer, TrackKind,
    TypedPayload,
};

use std::collections::HashMap;

use log::{debug, info, warn};

type Handler<P, S> = fn(&mut WorkerRouter<P, S>, &TypedPayload) -> Flow;

pub struct WorkerRouter<P, S> {
    player: P,
    sink: S,
    handlers: HashMap<CommandName, Handler<P, S>>,
    state: PlayerState,
    url: Option<String>,
    load: LoadId,
    volume: Option<u32>,
    mute: bool,
    duration_ms: i64,
    position_ms: i64,
    pause_requested: bool,
    options: Vec<PlayerOption>,
    quit: bool,
}

impl<P: Player, S: CommandSink> WorkerRouter<P, S> {
    pub fn new(player: P, sink: S) -> Self {
        let mut handlers: HashMap<CommandName, Handler<P, S>> = HashMap::new();

        handlers.insert(CommandName::Play, |r, _| r.on_play());
        handlers.insert(CommandName::Pause, |r, _| r.on_pause());
        handlers.insert(CommandName::Stop, |r, _| r.on_stop());
        handlers.insert(CommandName::Seek, |r, p| r.on_seek(p));
        handlers.insert(CommandName::SetVolume, |r, p| r.on_set_volume(p));
        handlers.insert(CommandName::SetMute, |r, p| r.on_set_mute(p));
        handlers.insert(CommandName::SetUrl, |r, p| r.on_set_url(p));
        handlers.insert(CommandName::SetVideoTrack, |r, p| {
            r.on_select_track(TrackKind::Video, p)
        });
        handlers.insert(CommandName::SetAudioTrack, |r, p| {
            r.on_select_track(TrackKind::Audio, p)
        });
        handlers.insert(CommandName::SetSubtitleTrack, |r, p| {
            r.on_select_track(TrackKind::Subtitle, p)
        });
        handlers.insert(CommandName::SetSubtitle, |r, p| {
            r.on_load_external(TrackKind::Subtitle, p)
        });
        handlers.insert(CommandName::SetAudio, |r, p| {
            r.on_load_external(TrackKind::Audio, p)
        });
        handlers.insert(CommandName::SetCharset, |r, p| r.on_option(CommandName::SetCharset, p));
        handlers.insert(CommandName::SetSubtitleAutoLoad, |r, p| {
            r.on_option(CommandName::SetSubtitleAutoLoad, p)
        });
        handlers.insert(CommandName::SetSubtitleEnabled, |r, p| {
            r.on_option(CommandName::SetSubtitleEnabled, p)
        });
        handlers.insert(CommandName::SetRenderer, |r, p| {
            r.on_option(CommandName::SetRenderer, p)
        });
        handlers.insert(CommandName::SetImageQuality, |r, p| {
            r.on_option(CommandName::SetImageQuality, p)
        });
        handlers.insert(CommandName::SetImageRatio, |r, p| {
            r.on_option(CommandName::SetImageRatio, p)
        });
        handlers.insert(CommandName::Echo, |r, p| r.on_echo(p));
        handlers.insert(CommandName::Quit, |r, _| r.on_quit());

        Self {
            player,
            sink,
            handlers,
            state: PlayerState::Idle,
            url: None,
            load: 0,
            volume: None,
            mute: false,
            duration_ms: 0,
            position_ms: 0,
            pause_requested: false,
            options: Vec::new(),
            quit: false,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Volume remembered from the last `setVolume`, already clamped.
    /// Id of the most recent `load`, `0` before any media was opened.
    pub fn load_id(&self) -> LoadId {
        self.load
    }

    pub fn volume(&self) -> Option<u32> {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    pub fn position_ms(&self) -> i64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn options(&self) -> &[PlayerOption] {
        &self.options
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Apply one command from the controller.
    pub fn handle(&mut self, command: Command) -> Flow {
        if self.quit {
            debug!("Ignoring '{command}' after quit");
            return Flow::Quit;
        }

        let name = command.name();
        match self.handlers.get(&name).copied() {
            Some(handler) => {
                debug!("Handling '{command}' in state {}", self.state);
                handler(self, command.payload())
            }
            None => {
                warn!("'{name}' is not a worker command, ignoring");
                Flow::Continue
            }
        }
    }

    /// Apply a lifecycle event from the media engine.
    pub fn on_player_event(&mut self, event: PlayerEvent) -> Flow {
        if self.quit {
            return Flow::Quit;
        }

        if let Some(load) = event.load()
            && load != self.load
        {
            debug!("Dropping event from replaced load {load} (current {})", self.load);
            return Flow::Continue;
        }

        match event {
            PlayerEvent::Ready {
                duration_ms,
                tracks,
                ..
            } => self.on_ready(duration_ms, tracks),
            PlayerEvent::Position(position_ms) => {
                if self.state.has_media() {
                    self.position_ms = position_ms.clamp(0, self.duration_ms.max(0));
                    self.sink.emit(Command::position_changed(self.position_ms));
                }
            }
            PlayerEvent::Finished { .. } => {
                if self.state.has_media() {
                    info!("Playback finished");
                    self.position_ms = 0;
                    self.transition(PlayerState::Stopped);
                }
            }
            PlayerEvent::Failed { reason, .. } => {
                warn!("Player failed: {reason}");
                self.transition(PlayerState::Error);
            }
        }

        Flow::Continue
    }

    fn transition(&mut self, next: PlayerState) {
        if self.state != next {
            info!("Player state {} -> {next}", self.state);
            self.state = next;
            self.sink.emit(Command::playback_state_changed(next));
        }
    }

    fn on_ready(&mut self, duration_ms: i64, tracks: MediaTracks) {
        if self.state != PlayerState::Loading {
            debug!("Ignoring ready event in state {}", self.state);
            return;
        }

        self.duration_ms = duration_ms.max(0);
        self.position_ms = 0;

        if let Some(volume) = self.volume {
            self.player.set_volume(volume);
        }
        self.player.set_mute(self.mute);

        self.sink.emit(Command::duration_changed(self.duration_ms));
        self.sink
            .emit(Command::tracks_updated(TrackKind::Video, &tracks.video));
        self.sink
            .emit(Command::tracks_updated(TrackKind::Audio, &tracks.audio));
        self.sink
            .emit(Command::tracks_updated(TrackKind::Subtitle, &tracks.subtitle));

        if self.pause_requested {
            self.pause_requested = false;
            self.player.pause();
            self.transition(PlayerState::Paused);
        } else {
            self.player.resume();
            self.transition(PlayerState::Playing);
        }
    }

    fn load(&mut self, url: String) {
        if self.state.has_media() || self.state == PlayerState::Loading {
            self.player.stop();
        }

        info!("Loading {url}");
        self.duration_ms = 0;
        self.position_ms = 0;
        self.pause_requested = false;
        self.load = self.load.wrapping_add(1);
        self.player.load(&url, self.load);
        self.url = Some(url);
        self.transition(PlayerState::Loading);
    }

    fn on_play(&mut self) -> Flow {
        match self.state {
            PlayerState::Paused => {
                self.player.resume();
                self.transition(PlayerState::Playing);
            }
            PlayerState::Loading => self.pause_requested = false,
            PlayerState::Stopped | PlayerState::Error => match self.url.clone() {
                Some(url) => self.load(url),
                None => debug!("Nothing to play"),
            },
            PlayerState::Playing | PlayerState::Idle => {
                debug!("play ignored in state {}", self.state)
            }
        }
        Flow::Continue
    }

    fn on_pause(&mut self) -> Flow {
        match self.state {
            PlayerState::Playing => {
                self.player.pause();
                self.transition(PlayerState::Paused);
            }
            PlayerState::Loading => self.pause_requested = true,
            _ => debug!("pause ignored in state {}", self.state),
        }
        Flow::Continue
    }

    fn on_stop(&mut self) -> Flow {
        match self.state {
            PlayerState::Playing | PlayerState::Paused | PlayerState::Loading => {
                self.player.stop();
                self.position_ms = 0;
                self.pause_requested = false;
                self.transition(PlayerState::Stopped);
            }
            _ => debug!("stop ignored in state {}", self.state),
        }
        Flow::Continue
    }

    fn on_seek(&mut self, payload: &TypedPayload) -> Flow {
        let Some(target) = payload.as_i64() else {
            return Flow::Continue;
        };

        if !self.state.has_media() {
            debug!("seek ignored in state {}", self.state);
            return Flow::Continue;
        }

        let position = target.clamp(0, self.duration_ms.max(0));
        self.player.seek(position);
        self.position_ms = position;
        self.sink.emit(Command::position_changed(position));
        Flow::Continue
    }

    fn on_set_volume(&mut self, payload: &TypedPayload) -> Flow {
        let Some(requested) = payload.as_u32() else {
            return Flow::Continue;
        };

        let volume = requested.min(MAX_VOLUME);
        if volume != requested {
            debug!("Volume {requested} clamped to {volume}");
        }

        self.volume = Some(volume);
        if self.state != PlayerState::Idle {
            self.player.set_volume(volume);
        }
        Flow::Continue
    }

    fn on_set_mute(&mut self, payload: &TypedPayload) -> Flow {
        let Some(mute) = payload.as_bool() else {
            return Flow::Continue;
        };

        self.mute = mute;
        if self.state != PlayerState::Idle {
            self.player.set_mute(mute);
        }
        Flow::Continue
    }

    fn on_set_url(&mut self, payload: &TypedPayload) -> Flow {
        let Some(url) = payload.as_str() else {
            return Flow::Continue;
        };

        if url.trim().is_empty() {
            self.url = None;
            return self.on_stop();
        }

        self.load(url.to_string());
        Flow::Continue
    }

    fn on_select_track(&mut self, kind: TrackKind, payload: &TypedPayload) -> Flow {
        if !self.state.has_media() {
            info!("{kind} track selection ignored, no media loaded");
            return Flow::Continue;
        }

        match payload {
            TypedPayload::UInt32(id) => self.player.select_track(kind, *id),
            TypedPayload::String(path) => self.player.load_external(kind, path),
            other => warn!("{kind} track selection with unexpected payload {other}"),
        }
        Flow::Continue
    }

    fn on_load_external(&mut self, kind: TrackKind, payload: &TypedPayload) -> Flow {
        let Some(path) = payload.as_str() else {
            return Flow::Continue;
        };

        if !self.state.has_media() {
            info!("External {kind} file ignored, no media loaded");
            return Flow::Continue;
        }

        self.player.load_external(kind, path);
        Flow::Continue
    }

    fn on_option(&mut self, name: CommandName, payload: &TypedPayload) -> Flow {
        let option = match (name, payload) {
            (CommandName::SetCharset, TypedPayload::String(charset)) => {
                PlayerOption::Charset(charset.clone())
            }
            (CommandName::SetSubtitleAutoLoad, TypedPayload::Bool(enabled)) => {
                PlayerOption::SubtitleAutoLoad(*enabled)
            }
            (CommandName::SetSubtitleEnabled, TypedPayload::Bool(enabled)) => {
                PlayerOption::SubtitleEnabled(*enabled)
            }
            (CommandName::SetRenderer, TypedPayload::Int64(id)) => match Renderer::from_id(*id) {
                Some(renderer) => PlayerOption::Renderer(renderer),
                None => {
                    warn!("Unknown renderer id {id}, ignoring");
                    return Flow::Continue;
                }
            },
            (CommandName::SetImageQuality, TypedPayload::String(quality)) => {
                match quality.parse::<ImageQuality>() {
                    Ok(quality) => PlayerOption::ImageQuality(quality),
                    Err(e) => {
                        warn!("{e}, ignoring");
                        return Flow::Continue;
                    }
                }
            }
            (CommandName::SetImageRatio, TypedPayload::Bool(fit)) => PlayerOption::FitDesktop(*fit),
            (name, payload) => {
                warn!("'{name}' with unexpected payload {payload}");
                return Flow::Continue;
            }
        };

        self.player.apply_option(&option);
        self.options
            .retain(|existing| std::mem::discriminant(existing) != std::mem::discriminant(&option));
        self.options.push(option);
        Flow::Continue
    }

    fn on_echo(&mut self, payload: &TypedPayload) -> Flow {
        self.sink.emit(Command::echo(payload.clone()));
        Flow::Continue
    }

    fn on_quit(&mut self) -> Flow {
        info!("Quit received, releasing media");
        if self.state.has_media() || self.state == PlayerState::Loading {
            self.player.stop();
        }
        self.quit = true;
        Flow::Quit
    }
}
