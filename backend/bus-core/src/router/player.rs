use models::{ImageQuality, Renderer, TrackInfo, TrackKind};

/// Playback option that applies in any state and is remembered across loads.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerOption {
    Charset(String),
    SubtitleAutoLoad(bool),
    SubtitleEnabled(bool),
    Renderer(Renderer),
    ImageQuality(ImageQuality),
    FitDesktop(bool),
}

/// Streams of the loaded media, reported once loading completes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaTracks {
    pub video: Vec<TrackInfo>,
    pub audio: Vec<TrackInfo>,
    pub subtitle: Vec<TrackInfo>,
}

/// Identifies one `load` call. Events tagged with an older id belong to media that
/// has since been replaced.
pub type LoadId = u64;

/// Lifecycle notifications from the media engine, fed back into the worker router.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Ready {
        load: LoadId,
        duration_ms: i64,
        tracks: MediaTracks,
    },
    Position(i64),
    Finished {
        load: LoadId,
    },
    Failed {
        load: LoadId,
        reason: String,
    },
}

impl PlayerEvent {
    /// The load this event reports on, `None` for untagged progress.
    pub fn load(&self) -> Option<LoadId> {
        match self {
            PlayerEvent::Ready { load, .. }
            | PlayerEvent::Finished { load }
            | PlayerEvent::Failed { load, .. } => Some(*load),
            PlayerEvent::Position(_) => None,
        }
    }
}

/// Control surface of the media engine. Decoding and rendering live behind it.
///
/// Calls are commands, not queries: the engine reports progress through
/// [`PlayerEvent`]s.
pub trait Player {
    /// Open `url`. `Ready`, `Failed` and `Finished` for this media must carry `load`.
    fn load(&mut self, url: &str, load: LoadId);
    fn resume(&mut self);
    fn pause(&mut self);
    /// Release the current media.
    fn stop(&mut self);
    fn seek(&mut self, position_ms: i64);
    fn set_volume(&mut self, volume: u32);
    fn set_mute(&mut self, mute: bool);
    fn select_track(&mut self, kind: TrackKind, id: u32);
    fn load_external(&mut self, kind: TrackKind, path: &str);
    fn apply_option(&mut self, option: &PlayerOption);
}
