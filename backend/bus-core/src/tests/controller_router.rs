use crate::router::Flow;
use crate::router::controller::ControllerRouter;
use crate::settings::SettingsStore;
use crate::tests::helpers::RecordingSink;

use models::{
    Command, CommandName, ImageQuality, PlayerState, Renderer, TrackInfo, TrackKind,
    TypedPayload,
};

use tempfile::TempDir;

fn router() -> (ControllerRouter<RecordingSink>, RecordingSink, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sink = RecordingSink::default();
    let settings = SettingsStore::with_defaults(dir.path());
    (ControllerRouter::new(sink.clone(), settings), sink, dir)
}

/// **VALUE**: Verifies worker status commands update the UI state.
///
/// **WHY THIS MATTERS**: The tray menu and position display are rendered from this state only.
///
/// **BUG THIS CATCHES**: Would catch a status command routed to the wrong field, or track
/// lists of one kind overwriting another.
#[test]
fn given_status_commands_when_handled_then_ui_state_updated() {
    // GIVEN: A controller
    let (mut router, _sink, _dir) = router();
    let subtitles = vec![TrackInfo::new(4, "fr", "Forced")];

    // WHEN: The worker reports its status
    router.handle(Command::playback_state_changed(PlayerState::Playing));
    router.handle(Command::duration_changed(90_000));
    router.handle(Command::position_changed(1_500));
    router.handle(Command::tracks_updated(TrackKind::Subtitle, &subtitles));
    router.handle(Command::echo(TypedPayload::UInt32(7)));

    // THEN: Reflected in the UI state
    let ui = router.ui();
    assert_eq!(ui.playback, PlayerState::Playing);
    assert_eq!(ui.duration_ms, 90_000);
    assert_eq!(ui.position_ms, 1_500);
    assert_eq!(ui.tracks(TrackKind::Subtitle), subtitles.as_slice());
    assert!(ui.tracks(TrackKind::Audio).is_empty());
    assert_eq!(ui.last_echo, Some(TypedPayload::UInt32(7)));
}

/// **VALUE**: Verifies a worker-initiated quit ends the controller loop.
///
/// **WHY THIS MATTERS**: When the worker exits on its own the controller must shut down too
/// instead of sending into a dead session.
///
/// **BUG THIS CATCHES**: Would catch quit from the worker being logged and ignored.
#[test]
fn given_worker_quit_when_handled_then_returns_quit() {
    // GIVEN: A controller
    let (mut router, _sink, _dir) = router();

    // WHEN: The worker sends quit
    let flow = router.handle(Command::quit());

    // THEN: Terminal
    assert_eq!(flow, Flow::Quit);
    assert!(router.ui().worker_quit);
}

/// **VALUE**: Verifies persisted preferences are written before the command is sent.
///
/// **WHY THIS MATTERS**: The settings are the source of truth for re-syncing a restarted
/// worker. A preference sent but not stored would be lost on the next restart.
///
/// **BUG THIS CATCHES**: Would catch an action that sends but forgets to store, or stores an
/// unclamped volume.
#[test]
fn given_user_actions_when_applied_then_settings_written_and_commands_sent() {
    // GIVEN: A controller
    let (mut router, sink, _dir) = router();

    // WHEN: The user changes preferences
    router.set_volume(150);
    router.set_mute(true);
    router.set_url("wallpaper.mp4");
    router.set_renderer(Renderer::Qt);
    router.set_image_quality(ImageQuality::Fastest);
    router.set_fit_desktop(false);

    // THEN: Stored
    let settings = router.settings();
    assert_eq!(settings.volume(), 99);
    assert!(settings.mute());
    assert_eq!(settings.url(), "wallpaper.mp4");
    assert_eq!(settings.renderer(), Renderer::Qt);
    assert_eq!(settings.image_quality(), ImageQuality::Fastest);
    assert!(!settings.fit());
    assert!(settings.is_dirty());

    // THEN: Sent, in order
    assert_eq!(
        sink.take(),
        vec![
            Command::set_volume(99),
            Command::set_mute(true),
            Command::set_url("wallpaper.mp4"),
            Command::set_renderer(Renderer::Qt),
            Command::set_image_quality(ImageQuality::Fastest),
            Command::set_image_ratio(false),
        ]
    );
}

/// **VALUE**: Verifies sync sends options first and the url last.
///
/// **WHY THIS MATTERS**: The worker opens media as soon as the url arrives. Options sent after
/// it would apply to an already-open decoder.
///
/// **BUG THIS CATCHES**: Would catch a reordering that puts `setUrl` before the options.
#[test]
fn given_saved_url_when_sync_commands_built_then_url_is_last() {
    // GIVEN: Settings with a url
    let (mut router, _sink, _dir) = router();
    router.settings_mut().set_url("video.mp4");

    // WHEN: Building the sync batch
    let commands = router.sync_commands();

    // THEN: Renderer first, url last
    assert_eq!(commands.first().map(Command::name), Some(CommandName::SetRenderer));
    assert_eq!(commands.last(), Some(&Command::set_url("video.mp4")));
    assert!(commands.contains(&Command::set_volume(9)));
}

/// **VALUE**: Verifies sync omits `setUrl` when no url is saved.
///
/// **WHY THIS MATTERS**: An empty `setUrl` means stop. Sending it to a fresh worker is harmless
/// but noisy, and masks a missing first-run url.
///
/// **BUG THIS CATCHES**: Would catch an empty url being sent on every start.
#[test]
fn given_no_url_when_sync_commands_built_then_no_set_url() {
    // GIVEN: Default settings
    let (router, sink, _dir) = router();

    // WHEN: Syncing
    router.sync_worker();

    // THEN: Options only
    let names = sink.names();
    assert!(!names.contains(&CommandName::SetUrl));
    assert_eq!(names.len(), router.sync_commands().len());
}

/// **VALUE**: Verifies transient actions are sent without touching settings.
///
/// **WHY THIS MATTERS**: Pausing or seeking is not a preference. Marking the store dirty would
/// rewrite the settings file on every exit.
///
/// **BUG THIS CATCHES**: Would catch transport actions being persisted.
#[test]
fn given_transport_actions_when_applied_then_settings_untouched() {
    // GIVEN: A controller
    let (router, sink, _dir) = router();

    // WHEN: Play, pause, seek, select a track
    router.play();
    router.pause();
    router.seek(1_000);
    router.select_track(TrackKind::Audio, 2);

    // THEN: Sent, store clean
    assert_eq!(
        sink.take(),
        vec![
            Command::play(),
            Command::pause(),
            Command::seek(1_000),
            Command::set_audio_track(2),
        ]
    );
    assert!(!router.settings().is_dirty());
}
