use crate::helpers::{finished, launcher_with_player, recv, spawn_player};

use dynamic_desktop::headless::NOMINAL_DURATION;

use models::{Command, CommandName, PlayerState, TrackInfo, TrackKind};

// ============================================================================
// Integration tests for the player process loop
// A launcher-side channel talks to the real event loop and headless engine
// over an in-memory stream
// ============================================================================

/// **VALUE**: Tests the launcher's startup sync reaching a playing player.
///
/// **WHY THIS MATTERS**: This is the path every session takes: settings first, url
/// last, then `play` from the user. The launcher must see the player report back.
///
/// **BUG THIS CATCHES**: Would catch engine events not being routed back onto the bus,
/// or status commands emitted in the wrong order.
#[tokio::test]
async fn given_url_and_play_when_sent_then_launcher_sees_ready_and_playing() {
    // GIVEN: A launcher connected to a running player
    let (launcher, mut inbox, player) = launcher_with_player();

    // WHEN: The launcher syncs a volume and url, then plays
    launcher.send(Command::set_volume(30)).unwrap();
    launcher
        .send(Command::set_url("https://example.com/loop.mp4"))
        .unwrap();
    launcher.send(Command::play()).unwrap();

    // THEN: Loading, then media details, then playing
    let mut states = Vec::new();
    let mut duration_ms = None;
    let mut video_tracks = Vec::new();
    while states.last() != Some(&PlayerState::Playing) {
        let command = recv(&mut inbox).await;
        match command.name() {
            CommandName::PlaybackStateChanged => {
                let state = command.payload().as_str().unwrap().parse().unwrap();
                states.push(state);
            }
            CommandName::DurationChanged => duration_ms = command.payload().as_i64(),
            CommandName::TracksUpdated(TrackKind::Video) => {
                video_tracks = TrackInfo::list_from_payload(command.payload());
            }
            _ => {}
        }
    }

    assert_eq!(states.first(), Some(&PlayerState::Loading));
    assert_eq!(
        duration_ms,
        Some(i64::try_from(NOMINAL_DURATION.as_millis()).unwrap())
    );
    assert_eq!(video_tracks.len(), 1);

    // AND: quit ends the loop with the synced volume applied
    launcher.send(Command::quit()).unwrap();
    let router = finished(player).await;
    assert!(router.has_quit());
    assert_eq!(router.player().volume(), 30);
}

/// **VALUE**: Tests that the player stops when the launcher goes away.
///
/// **WHY THIS MATTERS**: A launcher that crashes never sends `quit`. An orphaned player
/// would keep the wallpaper running with nobody able to stop it.
///
/// **BUG THIS CATCHES**: Would catch the event loop ignoring the session state and
/// waiting on an inbox that never closes.
#[tokio::test]
async fn given_launcher_stream_dropped_when_running_then_player_loop_ends() {
    // GIVEN: A player attached to a stream whose launcher end we own
    let (launcher_end, worker_end) = tokio::io::duplex(4096);
    let player = spawn_player(worker_end);

    // WHEN: The launcher end disappears
    drop(launcher_end);

    // THEN: The loop ends without a quit command
    let router = finished(player).await;
    assert!(!router.has_quit());
}

/// **VALUE**: Tests that an unreachable local file is reported as an error state.
///
/// **WHY THIS MATTERS**: The launcher shows the player state; a bad path in settings
/// must be visible rather than looking like an endless load.
///
/// **BUG THIS CATCHES**: Would catch `Failed` engine events being dropped by the loop.
#[tokio::test]
async fn given_missing_file_url_when_sent_then_launcher_sees_error_state() {
    // GIVEN
    let (launcher, mut inbox, player) = launcher_with_player();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.mp4");

    // WHEN
    launcher
        .send(Command::set_url(missing.to_string_lossy().into_owned()))
        .unwrap();

    // THEN
    loop {
        let command = recv(&mut inbox).await;
        if command.name() == CommandName::PlaybackStateChanged
            && command.payload().as_str() == Some(PlayerState::Error.as_str())
        {
            break;
        }
    }

    launcher.send(Command::quit()).unwrap();
    let router = finished(player).await;
    assert_eq!(router.state(), PlayerState::Error);
}
