// Unit tests for console dispatch, the status line and the OS version gate

use crate::console::ConsoleAction;
use crate::launcher::{ActionOutcome, dispatch, format_status, is_supported_windows_kernel};

use bus_core::router::CommandSink;
use bus_core::router::controller::ControllerRouter;
use bus_core::settings::SettingsStore;

use models::{Command, CommandName, PlayerState, Renderer, TrackInfo, TrackKind};

use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone, Default)]
struct Outbox(Arc<Mutex<Vec<Command>>>);

impl Outbox {
    fn names(&self) -> Vec<CommandName> {
        self.0.lock().iter().map(Command::name).collect()
    }
}

impl CommandSink for Outbox {
    fn emit(&self, command: Command) {
        self.0.lock().push(command);
    }
}

fn router(dir: &tempfile::TempDir) -> (ControllerRouter<Outbox>, Outbox) {
    let outbox = Outbox::default();
    let router = ControllerRouter::new(outbox.clone(), SettingsStore::with_defaults(dir.path()));
    (router, outbox)
}

/// **VALUE**: Tests that console actions become bus commands and settings writes.
///
/// **WHY THIS MATTERS**: This is the whole tray menu; each entry must send exactly the
/// command the player expects and persist the preference it represents.
///
/// **BUG THIS CATCHES**: Would catch an action routed to the wrong router method.
#[test]
fn given_console_actions_when_dispatched_then_commands_are_emitted() {
    // GIVEN
    let dir = tempfile::tempdir().unwrap();
    let (mut router, outbox) = router(&dir);

    // WHEN
    let outcomes = [
        dispatch(&mut router, ConsoleAction::Volume(40)),
        dispatch(&mut router, ConsoleAction::Renderer(Renderer::Qt)),
        dispatch(&mut router, ConsoleAction::Track(TrackKind::Audio, 2)),
        dispatch(&mut router, ConsoleAction::Play),
    ];

    // THEN
    assert!(outcomes.iter().all(|o| *o == ActionOutcome::Handled));
    assert_eq!(
        outbox.names(),
        vec![
            CommandName::SetVolume,
            CommandName::SetRenderer,
            CommandName::SetAudioTrack,
            CommandName::Play,
        ]
    );
    assert_eq!(router.settings().volume(), 40);
    assert_eq!(router.settings().renderer(), Renderer::Qt);
}

/// **VALUE**: Tests that launcher-only actions are handed back instead of sent.
///
/// **WHY THIS MATTERS**: Autostart needs the supervisor and quit ends the event loop;
/// neither belongs on the bus directly.
///
/// **BUG THIS CATCHES**: Would catch `quit` being emitted twice (once here, once on
/// shutdown) or autostart being silently dropped.
#[test]
fn given_launcher_actions_when_dispatched_then_outcome_is_returned() {
    // GIVEN
    let dir = tempfile::tempdir().unwrap();
    let (mut router, outbox) = router(&dir);

    // WHEN / THEN
    assert_eq!(
        dispatch(&mut router, ConsoleAction::Autostart(true)),
        ActionOutcome::Autostart(true)
    );
    assert_eq!(dispatch(&mut router, ConsoleAction::Status), ActionOutcome::Status);
    assert_eq!(dispatch(&mut router, ConsoleAction::Help), ActionOutcome::Help);
    assert_eq!(dispatch(&mut router, ConsoleAction::Quit), ActionOutcome::Quit);
    assert!(outbox.names().is_empty(), "Nothing should reach the bus");
}

/// **VALUE**: Tests the status line reflects what the worker reported.
///
/// **WHY THIS MATTERS**: It is the only view of the player in a headless session.
///
/// **BUG THIS CATCHES**: Would catch reading stale settings instead of UI state.
#[test]
fn given_worker_status_when_formatting_then_line_shows_state_and_tracks() {
    // GIVEN
    let dir = tempfile::tempdir().unwrap();
    let (mut router, _outbox) = router(&dir);
    router.set_url("/videos/rain.mp4");
    router.set_mute(true);
    router.handle(Command::playback_state_changed(PlayerState::Playing));
    router.handle(Command::duration_changed(60_000));
    router.handle(Command::position_changed(1_500));
    router.handle(Command::tracks_updated(
        TrackKind::Audio,
        &[TrackInfo::new(1, "en", "Stereo"), TrackInfo::new(2, "de", "Stereo")],
    ));

    // WHEN
    let line = format_status(router.ui(), router.settings());

    // THEN
    assert!(line.starts_with("playing 1500/60000 ms"), "got: {line}");
    assert!(line.contains("(muted)"), "got: {line}");
    assert!(line.contains("a2"), "got: {line}");
    assert!(line.ends_with("/videos/rain.mp4"), "got: {line}");
}

/// **VALUE**: Tests the Windows 7 floor for both version formats.
///
/// **WHY THIS MATTERS**: Older systems must exit with `-1` before spawning anything,
/// while newer ones (including bare build numbers) must pass.
///
/// **BUG THIS CATCHES**: Would catch comparing version strings lexically, where
/// "10.0" sorts before "6.1".
#[test]
fn given_kernel_versions_when_checking_support_then_windows_7_is_the_floor() {
    // GIVEN / WHEN / THEN
    assert!(is_supported_windows_kernel("6.1.7600"));
    assert!(is_supported_windows_kernel("6.1.7601"));
    assert!(is_supported_windows_kernel("10.0.22631"));
    assert!(is_supported_windows_kernel("22631"));
    assert!(!is_supported_windows_kernel("6.0.6002"));
    assert!(!is_supported_windows_kernel("6.1.7000"));
    assert!(!is_supported_windows_kernel("6002"));
    assert!(is_supported_windows_kernel("unknown"));
}
