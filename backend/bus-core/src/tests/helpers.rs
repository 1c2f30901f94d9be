//! Test doubles for the routers: a recording [`CommandSink`] and a scripted [`Player`].

use crate::router::CommandSink;
use crate::router::player::{LoadId, Player, PlayerOption};

use models::{Command, CommandName, TrackKind};

use std::sync::Arc;

use parking_lot::Mutex;

/// Sink that keeps every emitted command. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    emitted: Arc<Mutex<Vec<Command>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *self.emitted.lock())
    }

    pub fn names(&self) -> Vec<CommandName> {
        self.emitted.lock().iter().map(Command::name).collect()
    }
}

impl CommandSink for RecordingSink {
    fn emit(&self, command: Command) {
        self.emitted.lock().push(command);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Load(String),
    Resume,
    Pause,
    Stop,
    Seek(i64),
    Volume(u32),
    Mute(bool),
    SelectTrack(TrackKind, u32),
    LoadExternal(TrackKind, String),
    Option(PlayerOption),
}

/// Player that records calls instead of decoding anything.
#[derive(Debug, Default)]
pub struct FakePlayer {
    pub calls: Vec<PlayerCall>,
}

impl Player for FakePlayer {
    fn load(&mut self, url: &str, _load: LoadId) {
        self.calls.push(PlayerCall::Load(url.to_string()));
    }

    fn resume(&mut self) {
        self.calls.push(PlayerCall::Resume);
    }

    fn pause(&mut self) {
        self.calls.push(PlayerCall::Pause);
    }

    fn stop(&mut self) {
        self.calls.push(PlayerCall::Stop);
    }

    fn seek(&mut self, position_ms: i64) {
        self.calls.push(PlayerCall::Seek(position_ms));
    }

    fn set_volume(&mut self, volume: u32) {
        self.calls.push(PlayerCall::Volume(volume));
    }

    fn set_mute(&mut self, mute: bool) {
        self.calls.push(PlayerCall::Mute(mute));
    }

    fn select_track(&mut self, kind: TrackKind, id: u32) {
        self.calls.push(PlayerCall::SelectTrack(kind, id));
    }

    fn load_external(&mut self, kind: TrackKind, path: &str) {
        self.calls
            .push(PlayerCall::LoadExternal(kind, path.to_string()));
    }

    fn apply_option(&mut self, option: &PlayerOption) {
        self.calls.push(PlayerCall::Option(option.clone()));
    }
}
