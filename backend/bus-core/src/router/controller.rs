use crate::router::{CommandSink, Flow};
use crate::settings::SettingsStore;

use models::{
    Command, CommandName, ImageQuality, PlayerState, Renderer, TrackInfo, TrackKind, TypedPayload,
};

use log::{debug, info, warn};

/// What the controller shows about the worker. Updated only from worker status commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
    pub playback: PlayerState,
    pub position_ms: i64,
    pub duration_ms: i64,
    pub video_tracks: Vec<TrackInfo>,
    pub audio_tracks: Vec<TrackInfo>,
    pub subtitle_tracks: Vec<TrackInfo>,
    pub last_echo: Option<TypedPayload>,
    /// The worker announced it is exiting on its own.
    pub worker_quit: bool,
}

impl UiState {
    pub fn tracks(&self, kind: TrackKind) -> &[TrackInfo] {
        match kind {
            TrackKind::Video => &self.video_tracks,
            TrackKind::Audio => &self.audio_tracks,
            TrackKind::Subtitle => &self.subtitle_tracks,
        }
    }
}

/// Controller-side router.
///
/// User actions that correspond to a persisted preference write the
/// [`SettingsStore`] first, then emit the command.
pub struct ControllerRouter<S> {
    sink: S,
    settings: SettingsStore,
    ui: UiState,
}

impl<S: CommandSink> ControllerRouter<S> {
    pub fn new(sink: S, settings: SettingsStore) -> Self {
        Self {
            sink,
            settings,
            ui: UiState::default(),
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn into_settings(self) -> SettingsStore {
        self.settings
    }

    /// Apply one status command from the worker.
    pub fn handle(&mut self, command: Command) -> Flow {
        let name = command.name();

        match name {
            CommandName::PlaybackStateChanged => match command.payload().as_str() {
                Some(state) => match state.parse::<PlayerState>() {
                    Ok(state) => {
                        debug!("Worker playback state: {state}");
                        self.ui.playback = state;
                    }
                    Err(()) => warn!("Unknown playback state '{state}'"),
                },
                None => warn!("Playback state without text payload"),
            },
            CommandName::PositionChanged => {
                if let Some(position) = command.payload().as_i64() {
                    self.ui.position_ms = position;
                }
            }
            CommandName::DurationChanged => {
                if let Some(duration) = command.payload().as_i64() {
                    self.ui.duration_ms = duration;
                }
            }
            CommandName::TracksUpdated(kind) => {
                let tracks = TrackInfo::list_from_payload(command.payload());
                debug!("Worker reported {} {kind} track(s)", tracks.len());
                match kind {
                    TrackKind::Video => self.ui.video_tracks = tracks,
                    TrackKind::Audio => self.ui.audio_tracks = tracks,
                    TrackKind::Subtitle => self.ui.subtitle_tracks = tracks,
                }
            }
            CommandName::Echo => self.ui.last_echo = Some(command.into_payload()),
            CommandName::Quit => {
                info!("Worker requested quit");
                self.ui.worker_quit = true;
                return Flow::Quit;
            }
            other => warn!("'{other}' is not a controller command, ignoring"),
        }

        Flow::Continue
    }

    /// Commands that bring a freshly connected worker in line with the settings.
    ///
    /// Options come first so the media is opened with them already applied.
    pub fn sync_commands(&self) -> Vec<Command> {
        let settings = &self.settings;
        let mut commands = vec![
            Command::set_renderer(settings.renderer()),
            Command::set_image_quality(settings.image_quality()),
            Command::set_image_ratio(settings.fit()),
            Command::set_charset(settings.charset()),
            Command::set_subtitle_auto_load(settings.subtitle_auto_load()),
            Command::set_subtitle_enabled(settings.subtitle_enabled()),
            Command::set_mute(settings.mute()),
            Command::set_volume(settings.volume()),
        ];

        let url = settings.url();
        if !url.trim().is_empty() {
            commands.push(Command::set_url(url));
        }

        commands
    }

    pub fn sync_worker(&self) {
        for command in self.sync_commands() {
            self.sink.emit(command);
        }
    }

    pub fn play(&self) {
        self.sink.emit(Command::play());
    }

    pub fn pause(&self) {
        self.sink.emit(Command::pause());
    }

    pub fn stop(&self) {
        self.sink.emit(Command::stop());
    }

    pub fn seek(&self, position_ms: i64) {
        self.sink.emit(Command::seek(position_ms));
    }

    pub fn set_volume(&mut self, volume: u32) {
        self.settings.set_volume(volume);
        self.sink.emit(Command::set_volume(self.settings.volume()));
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.settings.set_mute(mute);
        self.sink.emit(Command::set_mute(mute));
    }

    pub fn set_url(&mut self, url: &str) {
        self.settings.set_url(url);
        self.sink.emit(Command::set_url(url));
    }

    pub fn select_track(&self, kind: TrackKind, id: u32) {
        let command = match kind {
            TrackKind::Video => Command::set_video_track(id),
            TrackKind::Audio => Command::set_audio_track(id),
            TrackKind::Subtitle => Command::set_subtitle_track(id),
        };
        self.sink.emit(command);
    }

    pub fn open_subtitle(&self, path: &str) {
        self.sink.emit(Command::set_subtitle(path));
    }

    pub fn open_audio(&self, path: &str) {
        self.sink.emit(Command::set_audio(path));
    }

    pub fn set_charset(&mut self, charset: &str) {
        self.settings.set_charset(charset);
        self.sink.emit(Command::set_charset(charset));
    }

    pub fn set_subtitle_auto_load(&mut self, enabled: bool) {
        self.settings.set_subtitle_auto_load(enabled);
        self.sink.emit(Command::set_subtitle_auto_load(enabled));
    }

    pub fn set_subtitle_enabled(&mut self, enabled: bool) {
        self.settings.set_subtitle_enabled(enabled);
        self.sink.emit(Command::set_subtitle_enabled(enabled));
    }

    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.settings.set_renderer(renderer);
        self.sink.emit(Command::set_renderer(renderer));
    }

    pub fn set_image_quality(&mut self, quality: ImageQuality) {
        self.settings.set_image_quality(quality);
        self.sink.emit(Command::set_image_quality(quality));
    }

    pub fn set_fit_desktop(&mut self, fit: bool) {
        self.settings.set_fit(fit);
        self.sink.emit(Command::set_image_ratio(fit));
    }

    pub fn echo(&self, payload: TypedPayload) {
        self.sink.emit(Command::echo(payload));
    }

    pub fn quit(&self) {
        self.sink.emit(Command::quit());
    }
}
