use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

/// Worker-side playback state. Only the worker router mutates it; the controller sees it
/// through `playbackStateChanged` as its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
    Error,
}

impl PlayerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Loading => "loading",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Stopped => "stopped",
            PlayerState::Error => "error",
        }
    }

    /// Media is open and can be repositioned.
    pub fn has_media(&self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }
}

impl Display for PlayerState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.as_str())
    }
}

impl FromStr for PlayerState {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "idle" => Ok(PlayerState::Idle),
            "loading" => Ok(PlayerState::Loading),
            "playing" => Ok(PlayerState::Playing),
            "paused" => Ok(PlayerState::Paused),
            "stopped" => Ok(PlayerState::Stopped),
            "error" => Ok(PlayerState::Error),
            _ => Err(()),
        }
    }
}
