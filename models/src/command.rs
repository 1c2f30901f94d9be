use crate::error::model_error::ModelError;
use crate::options::{ImageQuality, Renderer};
use crate::payload::{PayloadShape, TypedPayload};
use crate::player_state::PlayerState;
use crate::track::{TrackInfo, TrackKind};

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;

/// Which way a command normally travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToWorker,
    ToController,
    Both,
}

/// Closed command vocabulary shared by both processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Play,
    Pause,
    Stop,
    Seek,
    SetVolume,
    SetMute,
    SetUrl,
    SetVideoTrack,
    SetAudioTrack,
    SetSubtitleTrack,
    SetSubtitle,
    SetAudio,
    SetCharset,
    SetSubtitleAutoLoad,
    SetSubtitleEnabled,
    SetRenderer,
    SetImageQuality,
    SetImageRatio,
    Quit,
    Echo,
    TracksUpdated(TrackKind),
    PositionChanged,
    DurationChanged,
    PlaybackStateChanged,
}

impl CommandName {
    pub const ALL: [CommandName; 26] = [
        CommandName::Play,
        CommandName::Pause,
        CommandName::Stop,
        CommandName::Seek,
        CommandName::SetVolume,
        CommandName::SetMute,
        CommandName::SetUrl,
        CommandName::SetVideoTrack,
        CommandName::SetAudioTrack,
        CommandName::SetSubtitleTrack,
        CommandName::SetSubtitle,
        CommandName::SetAudio,
        CommandName::SetCharset,
        CommandName::SetSubtitleAutoLoad,
        CommandName::SetSubtitleEnabled,
        CommandName::SetRenderer,
        CommandName::SetImageQuality,
        CommandName::SetImageRatio,
        CommandName::Quit,
        CommandName::Echo,
        CommandName::TracksUpdated(TrackKind::Video),
        CommandName::TracksUpdated(TrackKind::Audio),
        CommandName::TracksUpdated(TrackKind::Subtitle),
        CommandName::PositionChanged,
        CommandName::DurationChanged,
        CommandName::PlaybackStateChanged,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            CommandName::Play => "play",
            CommandName::Pause => "pause",
            CommandName::Stop => "stop",
            CommandName::Seek => "seek",
            CommandName::SetVolume => "setVolume",
            CommandName::SetMute => "setMute",
            CommandName::SetUrl => "setUrl",
            CommandName::SetVideoTrack => "setVideoTrack",
            CommandName::SetAudioTrack => "setAudioTrack",
            CommandName::SetSubtitleTrack => "setSubtitleTrack",
            CommandName::SetSubtitle => "setSubtitle",
            CommandName::SetAudio => "setAudio",
            CommandName::SetCharset => "setCharset",
            CommandName::SetSubtitleAutoLoad => "setSubtitleAutoLoad",
            CommandName::SetSubtitleEnabled => "setSubtitleEnabled",
            CommandName::SetRenderer => "setRenderer",
            CommandName::SetImageQuality => "setImageQuality",
            CommandName::SetImageRatio => "setImageRatio",
            CommandName::Quit => "quit",
            CommandName::Echo => "echo",
            CommandName::TracksUpdated(TrackKind::Video) => "videoTracksUpdated",
            CommandName::TracksUpdated(TrackKind::Audio) => "audioTracksUpdated",
            CommandName::TracksUpdated(TrackKind::Subtitle) => "subtitleTracksUpdated",
            CommandName::PositionChanged => "positionChanged",
            CommandName::DurationChanged => "durationChanged",
            CommandName::PlaybackStateChanged => "playbackStateChanged",
        }
    }

    /// Resolves a wire name. Unknown names are a malformed command.
    #[track_caller]
    pub fn from_wire(name: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.wire_name() == name)
            .ok_or_else(|| ModelError::UnknownName {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    pub fn shape(&self) -> PayloadShape {
        match self {
            CommandName::Play | CommandName::Pause | CommandName::Stop | CommandName::Quit => {
                PayloadShape::None
            }
            CommandName::Seek
            | CommandName::SetRenderer
            | CommandName::PositionChanged
            | CommandName::DurationChanged => PayloadShape::Int64,
            CommandName::SetVolume | CommandName::SetVideoTrack | CommandName::SetAudioTrack => {
                PayloadShape::UInt32
            }
            CommandName::SetMute
            | CommandName::SetSubtitleAutoLoad
            | CommandName::SetSubtitleEnabled
            | CommandName::SetImageRatio => PayloadShape::Bool,
            CommandName::SetUrl
            | CommandName::SetSubtitle
            | CommandName::SetAudio
            | CommandName::SetCharset
            | CommandName::SetImageQuality
            | CommandName::PlaybackStateChanged => PayloadShape::String,
            CommandName::SetSubtitleTrack => PayloadShape::TrackOrFile,
            CommandName::TracksUpdated(_) => PayloadShape::StringList,
            CommandName::Echo => PayloadShape::Any,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            CommandName::Quit | CommandName::Echo => Direction::Both,
            CommandName::TracksUpdated(_)
            | CommandName::PositionChanged
            | CommandName::DurationChanged
            | CommandName::PlaybackStateChanged => Direction::ToController,
            _ => Direction::ToWorker,
        }
    }
}

impl Display for CommandName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.wire_name())
    }
}

/// A named operation with its argument.
///
/// Immutable once built: [`Command::new`] validates the payload against the name's
/// shape, and the typed constructors can only produce valid pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: CommandName,
    payload: TypedPayload,
}

impl Command {
    #[track_caller]
    pub fn new(name: CommandName, payload: TypedPayload) -> Result<Self, ModelError> {
        if !name.shape().accepts(&payload) {
            return Err(ModelError::PayloadMismatch {
                message: format!(
                    "'{name}' expects {:?}, got {:?}",
                    name.shape(),
                    payload.kind()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { name, payload })
    }

    fn unchecked(name: CommandName, payload: TypedPayload) -> Self {
        Self { name, payload }
    }

    pub fn name(&self) -> CommandName {
        self.name
    }

    pub fn payload(&self) -> &TypedPayload {
        &self.payload
    }

    pub fn into_payload(self) -> TypedPayload {
        self.payload
    }

    pub fn is_quit(&self) -> bool {
        self.name == CommandName::Quit
    }

    pub fn play() -> Self {
        Self::unchecked(CommandName::Play, TypedPayload::None)
    }

    pub fn pause() -> Self {
        Self::unchecked(CommandName::Pause, TypedPayload::None)
    }

    pub fn stop() -> Self {
        Self::unchecked(CommandName::Stop, TypedPayload::None)
    }

    pub fn quit() -> Self {
        Self::unchecked(CommandName::Quit, TypedPayload::None)
    }

    pub fn seek(position_ms: i64) -> Self {
        Self::unchecked(CommandName::Seek, TypedPayload::Int64(position_ms))
    }

    pub fn set_volume(volume: u32) -> Self {
        Self::unchecked(CommandName::SetVolume, TypedPayload::UInt32(volume))
    }

    pub fn set_mute(mute: bool) -> Self {
        Self::unchecked(CommandName::SetMute, TypedPayload::Bool(mute))
    }

    pub fn set_url(url: impl Into<String>) -> Self {
        Self::unchecked(CommandName::SetUrl, TypedPayload::String(url.into()))
    }

    pub fn set_video_track(id: u32) -> Self {
        Self::unchecked(CommandName::SetVideoTrack, TypedPayload::UInt32(id))
    }

    pub fn set_audio_track(id: u32) -> Self {
        Self::unchecked(CommandName::SetAudioTrack, TypedPayload::UInt32(id))
    }

    pub fn set_subtitle_track(id: u32) -> Self {
        Self::unchecked(CommandName::SetSubtitleTrack, TypedPayload::UInt32(id))
    }

    pub fn set_subtitle_track_file(path: impl Into<String>) -> Self {
        Self::unchecked(CommandName::SetSubtitleTrack, TypedPayload::String(path.into()))
    }

    pub fn set_subtitle(path: impl Into<String>) -> Self {
        Self::unchecked(CommandName::SetSubtitle, TypedPayload::String(path.into()))
    }

    pub fn set_audio(path: impl Into<String>) -> Self {
        Self::unchecked(CommandName::SetAudio, TypedPayload::String(path.into()))
    }

    pub fn set_charset(charset: impl Into<String>) -> Self {
        Self::unchecked(CommandName::SetCharset, TypedPayload::String(charset.into()))
    }

    pub fn set_subtitle_auto_load(enabled: bool) -> Self {
        Self::unchecked(CommandName::SetSubtitleAutoLoad, TypedPayload::Bool(enabled))
    }

    pub fn set_subtitle_enabled(enabled: bool) -> Self {
        Self::unchecked(CommandName::SetSubtitleEnabled, TypedPayload::Bool(enabled))
    }

    pub fn set_renderer(renderer: Renderer) -> Self {
        Self::unchecked(CommandName::SetRenderer, TypedPayload::Int64(renderer.id()))
    }

    pub fn set_image_quality(quality: ImageQuality) -> Self {
        Self::unchecked(
            CommandName::SetImageQuality,
            TypedPayload::String(quality.as_str().to_string()),
        )
    }

    pub fn set_image_ratio(fit_desktop: bool) -> Self {
        Self::unchecked(CommandName::SetImageRatio, TypedPayload::Bool(fit_desktop))
    }

    pub fn echo(payload: TypedPayload) -> Self {
        Self::unchecked(CommandName::Echo, payload)
    }

    pub fn tracks_updated(kind: TrackKind, tracks: &[TrackInfo]) -> Self {
        Self::unchecked(
            CommandName::TracksUpdated(kind),
            TrackInfo::list_to_payload(tracks),
        )
    }

    pub fn position_changed(position_ms: i64) -> Self {
        Self::unchecked(CommandName::PositionChanged, TypedPayload::Int64(position_ms))
    }

    pub fn duration_changed(duration_ms: i64) -> Self {
        Self::unchecked(CommandName::DurationChanged, TypedPayload::Int64(duration_ms))
    }

    pub fn playback_state_changed(state: PlayerState) -> Self {
        Self::unchecked(
            CommandName::PlaybackStateChanged,
            TypedPayload::String(state.as_str().to_string()),
        )
    }
}

impl Display for Command {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}({})", self.name, self.payload)
    }
}
