// Unit tests for the headless media engine

use crate::headless::{HeadlessPlayer, NOMINAL_DURATION};

use bus_core::router::CommandSink;
use bus_core::router::player::{Player, PlayerEvent};
use bus_core::router::worker::WorkerRouter;

use models::{Command, PlayerState, TrackKind};

use std::time::Duration;

/// **VALUE**: Tests that opening a missing local file reports failure.
///
/// **WHY THIS MATTERS**: A stale url in settings must put the worker in the error
/// state rather than pretending to play.
///
/// **BUG THIS CATCHES**: Would catch skipping the existence check for local paths.
#[test]
fn given_missing_file_when_loading_then_emits_failed() {
    // GIVEN: A path that does not exist
    let (mut player, mut events) = HeadlessPlayer::new();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.mp4");

    // WHEN
    player.load(&missing.to_string_lossy(), 1);

    // THEN
    match events.try_recv() {
        Ok(PlayerEvent::Failed { load, reason }) => {
            assert_eq!(load, 1);
            assert!(reason.contains("gone.mp4"), "got: {reason}");
        }
        other => panic!("Expected Failed, got {other:?}"),
    }
}

/// **VALUE**: Tests that an existing file and a remote url both open.
///
/// **WHY THIS MATTERS**: Remote streams can't be checked up front and must not be
/// rejected as missing files.
///
/// **BUG THIS CATCHES**: Would catch treating `http://` urls as local paths.
#[test]
fn given_existing_file_or_remote_url_when_loading_then_emits_ready() {
    // GIVEN
    let (mut player, mut events) = HeadlessPlayer::new();
    let file = tempfile::NamedTempFile::new().unwrap();
    let expected_ms = i64::try_from(NOMINAL_DURATION.as_millis()).unwrap();

    for (load_id, url) in [1, 2].into_iter().zip([
        file.path().to_string_lossy().into_owned(),
        String::from("https://example.com/loop.mp4"),
    ]) {
        // WHEN
        player.load(&url, load_id);

        // THEN
        match events.try_recv() {
            Ok(PlayerEvent::Ready {
                load,
                duration_ms,
                tracks,
            }) => {
                assert_eq!(load, load_id);
                assert_eq!(duration_ms, expected_ms);
                assert_eq!(tracks.video.len(), 1);
                assert_eq!(tracks.audio.len(), 1);
                assert!(tracks.subtitle.is_empty());
            }
            other => panic!("Expected Ready for {url}, got {other:?}"),
        }
    }
}

/// **VALUE**: Tests that external files are recorded and cleared on the next load.
///
/// **WHY THIS MATTERS**: Subtitle and audio files belong to one media; carrying them
/// over would attach the wrong subtitles to the next video.
///
/// **BUG THIS CATCHES**: Would catch `load` forgetting to reset external files.
#[test]
fn given_external_files_when_loading_new_media_then_list_is_cleared() {
    // GIVEN
    let (mut player, _events) = HeadlessPlayer::new();
    player.load_external(TrackKind::Subtitle, "/subs/a.srt");
    player.load_external(TrackKind::Audio, "/audio/b.ac3");
    assert_eq!(player.external_files().len(), 2);

    // WHEN
    player.load("https://example.com/next.mp4", 2);

    // THEN
    assert!(player.external_files().is_empty());
}

/// **VALUE**: Tests that the clock only reports positions while playing.
///
/// **WHY THIS MATTERS**: Position updates drive the controller's status line; a
/// paused player must stay quiet.
///
/// **BUG THIS CATCHES**: Would catch the clock ticking regardless of `resume`.
#[tokio::test]
async fn given_clock_when_resumed_then_reports_position() {
    // GIVEN: A loaded player with a fast clock
    let (mut player, mut events) = HeadlessPlayer::new();
    player.load("https://example.com/loop.mp4", 1);
    assert!(matches!(events.recv().await, Some(PlayerEvent::Ready { .. })));
    let clock = player.spawn_clock(Duration::from_millis(10));

    // WHEN: Paused, nothing arrives
    let quiet = tokio::time::timeout(Duration::from_millis(100), events.recv()).await;
    assert!(quiet.is_err(), "Paused clock should not report");

    // AND: Resumed, a position arrives
    player.resume();
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("Clock should report while playing");

    // THEN
    match event {
        Some(PlayerEvent::Position(position_ms)) => assert!(position_ms > 0),
        other => panic!("Expected Position, got {other:?}"),
    }

    clock.abort();
}

struct Discard;

impl CommandSink for Discard {
    fn emit(&self, _command: Command) {}
}

/// **VALUE**: Tests that a missing file followed straight away by a valid one ends up playing.
///
/// **WHY THIS MATTERS**: The startup sync replays a stored url that may be gone, and the user's
/// next url is handled before the engine's failure report for the first one arrives.
///
/// **BUG THIS CATCHES**: Would catch the first load's `Failed` putting the second one in
/// `Error`, after which its `Ready` is ignored.
#[test]
fn given_missing_then_existing_url_when_events_drained_then_playing() {
    // GIVEN: A router over the headless engine
    let (player, mut events) = HeadlessPlayer::new();
    let mut router = WorkerRouter::new(player, Discard);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("old.mp4");
    let file = tempfile::NamedTempFile::new().unwrap();

    // WHEN: Both urls are handled before any engine event
    router.handle(Command::set_url(missing.to_string_lossy().into_owned()));
    router.handle(Command::set_url(file.path().to_string_lossy().into_owned()));
    while let Ok(event) = events.try_recv() {
        router.on_player_event(event);
    }

    // THEN
    assert_eq!(router.state(), PlayerState::Playing);
}
