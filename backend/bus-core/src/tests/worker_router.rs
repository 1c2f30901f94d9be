use crate::router::Flow;
use crate::router::player::{LoadId, MediaTracks, PlayerEvent, PlayerOption};
use crate::router::worker::WorkerRouter;
use crate::tests::helpers::{FakePlayer, PlayerCall, RecordingSink};

use models::{
    Command, CommandName, ImageQuality, PlayerState, Renderer, TrackInfo, TrackKind,
    TypedPayload,
};

fn router() -> (WorkerRouter<FakePlayer, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::default();
    (WorkerRouter::new(FakePlayer::default(), sink.clone()), sink)
}

fn ready(load: LoadId, duration_ms: i64) -> PlayerEvent {
    PlayerEvent::Ready {
        load,
        duration_ms,
        tracks: MediaTracks {
            video: vec![TrackInfo::new(0, "und", "main")],
            audio: vec![TrackInfo::new(1, "en", "Stereo")],
            subtitle: Vec::new(),
        },
    }
}

fn playing(duration_ms: i64) -> (WorkerRouter<FakePlayer, RecordingSink>, RecordingSink) {
    let (mut router, sink) = router();
    router.handle(Command::set_url("video.mp4"));
    router.on_player_event(ready(router.load_id(), duration_ms));
    router.player_mut().calls.clear();
    sink.take();
    (router, sink)
}

/// **VALUE**: Verifies the load path `setUrl` -> ready -> playing and the status it reports.
///
/// **WHY THIS MATTERS**: This is the first thing every session does. The controller's UI is
/// built entirely from the duration, track lists and state changes emitted here.
///
/// **BUG THIS CATCHES**: Would catch a missing state change, track lists reported before the
/// duration, or playback starting before the media reported ready.
#[test]
fn given_idle_when_url_set_and_media_ready_then_reports_tracks_and_plays() {
    // GIVEN: A fresh worker
    let (mut router, sink) = router();

    // WHEN: A url arrives
    let flow = router.handle(Command::set_url("video.mp4"));

    // THEN: Loading, media opened, state reported
    assert_eq!(flow, Flow::Continue);
    assert_eq!(router.state(), PlayerState::Loading);
    assert_eq!(router.url(), Some("video.mp4"));
    assert_eq!(
        router.player().calls,
        vec![PlayerCall::Load("video.mp4".to_string())]
    );
    assert_eq!(
        sink.take(),
        vec![Command::playback_state_changed(PlayerState::Loading)]
    );

    // WHEN: The engine reports ready
    router.on_player_event(ready(router.load_id(), 60_000));

    // THEN: Duration, three track lists, then Playing
    assert_eq!(router.state(), PlayerState::Playing);
    assert_eq!(router.duration_ms(), 60_000);
    assert_eq!(
        sink.names(),
        vec![
            CommandName::DurationChanged,
            CommandName::TracksUpdated(TrackKind::Video),
            CommandName::TracksUpdated(TrackKind::Audio),
            CommandName::TracksUpdated(TrackKind::Subtitle),
            CommandName::PlaybackStateChanged,
        ]
    );
    let emitted = sink.take();
    assert_eq!(
        TrackInfo::list_from_payload(emitted[2].payload()),
        vec![TrackInfo::new(1, "en", "Stereo")]
    );
    assert_eq!(
        emitted[4],
        Command::playback_state_changed(PlayerState::Playing)
    );
}

/// **VALUE**: Verifies out-of-range volume is clamped to 99 and remembered until media loads.
///
/// **WHY THIS MATTERS**: The controller sends the saved volume before the url during sync, so
/// the worker is still idle when it arrives. Dropping it would play at the engine default.
///
/// **BUG THIS CATCHES**: Would catch volume forwarded unclamped, or lost when set while idle.
#[test]
fn given_idle_when_volume_above_max_then_clamped_and_applied_on_ready() {
    // GIVEN: A fresh worker
    let (mut router, _sink) = router();

    // WHEN: Volume 150 arrives before any media
    router.handle(Command::set_volume(150));

    // THEN: Remembered as 99, nothing applied yet
    assert_eq!(router.volume(), Some(99));
    assert!(router.player().calls.is_empty());

    // WHEN: Media loads
    router.handle(Command::set_url("video.mp4"));
    router.on_player_event(ready(router.load_id(), 1_000));

    // THEN: The clamped volume reaches the engine
    assert!(router.player().calls.contains(&PlayerCall::Volume(99)));
    assert_eq!(router.state(), PlayerState::Playing);
}

/// **VALUE**: Verifies seek targets are clamped to `[0, duration]` and echoed as a position.
///
/// **WHY THIS MATTERS**: The engine's behaviour past the end is undefined. The controller's
/// slider also needs the effective position, not the requested one.
///
/// **BUG THIS CATCHES**: Would catch negative or past-the-end seeks reaching the engine.
#[test]
fn given_playing_when_seek_out_of_range_then_clamped_to_duration() {
    // GIVEN: Media of 10 seconds playing
    let (mut router, sink) = playing(10_000);

    // WHEN: Seeking past the end, then before the start
    router.handle(Command::seek(25_000));
    router.handle(Command::seek(-5));

    // THEN: Clamped both ways
    assert_eq!(
        router.player().calls,
        vec![PlayerCall::Seek(10_000), PlayerCall::Seek(0)]
    );
    assert_eq!(
        sink.take(),
        vec![Command::position_changed(10_000), Command::position_changed(0)]
    );
    assert_eq!(router.position_ms(), 0);
}

/// **VALUE**: Verifies `seek` before any media is ignored.
///
/// **WHY THIS MATTERS**: There is nothing to reposition, and an engine call here could crash
/// a real backend.
///
/// **BUG THIS CATCHES**: Would catch seeks forwarded in Idle or Loading.
#[test]
fn given_idle_when_seek_then_ignored() {
    // GIVEN: A fresh worker
    let (mut router, sink) = router();

    // WHEN: Seeking
    router.handle(Command::seek(5_000));

    // THEN: No engine call, nothing emitted
    assert!(router.player().calls.is_empty());
    assert!(sink.take().is_empty());
}

/// **VALUE**: Verifies a pause received while loading takes effect once the media is ready.
///
/// **WHY THIS MATTERS**: A user who pauses during a slow network load expects the video to
/// appear paused, not to start playing.
///
/// **BUG THIS CATCHES**: Would catch the pause being dropped because the state was Loading.
#[test]
fn given_loading_when_pause_then_media_opens_paused() {
    // GIVEN: Media loading
    let (mut router, _sink) = router();
    router.handle(Command::set_url("video.mp4"));

    // WHEN: Pause arrives, then the media is ready
    router.handle(Command::pause());
    router.on_player_event(ready(router.load_id(), 5_000));

    // THEN: Paused, never resumed
    assert_eq!(router.state(), PlayerState::Paused);
    assert!(!router.player().calls.contains(&PlayerCall::Resume));
    assert!(router.player().calls.contains(&PlayerCall::Pause));
}

/// **VALUE**: Verifies the play/pause/stop transitions and that play after stop reloads.
///
/// **WHY THIS MATTERS**: Stop releases the media, so resuming is impossible. Play must open the
/// last url again.
///
/// **BUG THIS CATCHES**: Would catch play after stop calling `resume` on released media.
#[test]
fn given_playing_when_pause_play_stop_play_then_follows_state_table() {
    // GIVEN: Playing
    let (mut router, _sink) = playing(5_000);

    // WHEN / THEN: pause
    router.handle(Command::pause());
    assert_eq!(router.state(), PlayerState::Paused);

    // WHEN / THEN: play resumes
    router.handle(Command::play());
    assert_eq!(router.state(), PlayerState::Playing);

    // WHEN / THEN: stop releases
    router.handle(Command::stop());
    assert_eq!(router.state(), PlayerState::Stopped);

    // WHEN / THEN: play reloads the last url
    router.handle(Command::play());
    assert_eq!(router.state(), PlayerState::Loading);
    assert_eq!(
        router.player().calls,
        vec![
            PlayerCall::Pause,
            PlayerCall::Resume,
            PlayerCall::Stop,
            PlayerCall::Load("video.mp4".to_string()),
        ]
    );
}

/// **VALUE**: Verifies an empty url behaves like `stop` and forgets the url.
///
/// **WHY THIS MATTERS**: Clearing the url in the controller is how the user turns the
/// wallpaper off.
///
/// **BUG THIS CATCHES**: Would catch the engine being asked to load an empty path.
#[test]
fn given_playing_when_empty_url_then_stops() {
    // GIVEN: Playing
    let (mut router, _sink) = playing(5_000);

    // WHEN: Empty url
    router.handle(Command::set_url(""));

    // THEN: Stopped, url cleared, no load
    assert_eq!(router.state(), PlayerState::Stopped);
    assert_eq!(router.url(), None);
    assert_eq!(router.player().calls, vec![PlayerCall::Stop]);

    // WHEN: Play with no url
    router.handle(Command::play());

    // THEN: Nothing to play
    assert_eq!(router.state(), PlayerState::Stopped);
}

/// **VALUE**: Verifies track selection before media is loaded is ignored.
///
/// **WHY THIS MATTERS**: Track ids only mean something for loaded media. Forwarding them
/// would select a track of whatever loads next.
///
/// **BUG THIS CATCHES**: Would catch track commands reaching the engine in Idle or Loading.
#[test]
fn given_no_media_when_track_selected_then_ignored() {
    // GIVEN: A fresh worker
    let (mut router, _sink) = router();

    // WHEN: Selecting tracks and loading an external subtitle
    router.handle(Command::set_audio_track(2));
    router.handle(Command::set_subtitle_track_file("/tmp/movie.srt"));
    router.handle(Command::set_subtitle("/tmp/movie.srt"));

    // THEN: No engine calls
    assert!(router.player().calls.is_empty());
}

/// **VALUE**: Verifies `setSubtitleTrack` dispatches on its payload variant.
///
/// **WHY THIS MATTERS**: An id selects an embedded stream, a path loads a file. Mixing them up
/// would try to open "3" as a file.
///
/// **BUG THIS CATCHES**: Would catch both variants being routed to the same engine call.
#[test]
fn given_playing_when_subtitle_track_by_id_or_path_then_selects_or_loads() {
    // GIVEN: Playing
    let (mut router, _sink) = playing(5_000);

    // WHEN: Selecting by id, then by path
    router.handle(Command::set_subtitle_track(3));
    router.handle(Command::set_subtitle_track_file("/tmp/movie.srt"));

    // THEN: Select then load
    assert_eq!(
        router.player().calls,
        vec![
            PlayerCall::SelectTrack(TrackKind::Subtitle, 3),
            PlayerCall::LoadExternal(TrackKind::Subtitle, "/tmp/movie.srt".to_string()),
        ]
    );
}

/// **VALUE**: Verifies options apply in any state and the latest value of each replaces the
/// previous one.
///
/// **WHY THIS MATTERS**: Sync sends options before the url. They must not be rejected while
/// idle, and repeated syncs must not pile up stale values.
///
/// **BUG THIS CATCHES**: Would catch options gated on state, or duplicates kept per kind.
#[test]
fn given_idle_when_options_set_twice_then_latest_kept() {
    // GIVEN: A fresh worker
    let (mut router, _sink) = router();

    // WHEN: Setting renderer twice and quality once
    router.handle(Command::set_renderer(Renderer::Gl));
    router.handle(Command::set_image_quality(ImageQuality::Fastest));
    router.handle(Command::set_renderer(Renderer::D2d));

    // THEN: Each call forwarded, one entry per option kind
    assert_eq!(router.player().calls.len(), 3);
    assert_eq!(
        router.options(),
        &[
            PlayerOption::ImageQuality(ImageQuality::Fastest),
            PlayerOption::Renderer(Renderer::D2d),
        ]
    );
}

/// **VALUE**: Verifies echo returns the payload untouched.
///
/// **WHY THIS MATTERS**: Echo is the liveness probe for the whole bus.
///
/// **BUG THIS CATCHES**: Would catch a payload being converted on the way back.
#[test]
fn given_any_state_when_echo_then_replies_with_same_payload() {
    // GIVEN: A fresh worker
    let (mut router, sink) = router();
    let payload = TypedPayload::StringList(vec!["a".to_string(), String::new()]);

    // WHEN: Echo
    router.handle(Command::echo(payload.clone()));

    // THEN: Same payload back
    assert_eq!(sink.take(), vec![Command::echo(payload)]);
}

/// **VALUE**: Verifies quit releases media and every later command is ignored.
///
/// **WHY THIS MATTERS**: After quit the worker is tearing down. Loading media now would race
/// with the exit and could leave a half-open decoder.
///
/// **BUG THIS CATCHES**: Would catch commands or engine events processed after quit.
#[test]
fn given_playing_when_quit_then_later_commands_ignored() {
    // GIVEN: Playing
    let (mut router, sink) = playing(5_000);

    // WHEN: Quit, then more traffic
    let flow = router.handle(Command::quit());
    let after = router.handle(Command::set_url("other.mp4"));
    router.on_player_event(PlayerEvent::Position(1_000));

    // THEN: Terminal
    assert_eq!(flow, Flow::Quit);
    assert_eq!(after, Flow::Quit);
    assert!(router.has_quit());
    assert_eq!(router.player().calls, vec![PlayerCall::Stop]);
    assert!(sink.take().is_empty());
}

/// **VALUE**: Verifies a controller-only command arriving at the worker is ignored.
///
/// **WHY THIS MATTERS**: A confused peer must not be able to drive the worker's state with
/// status notifications.
///
/// **BUG THIS CATCHES**: Would catch status commands being treated as actions.
#[test]
fn given_status_command_when_handled_by_worker_then_ignored() {
    // GIVEN: A fresh worker
    let (mut router, sink) = router();

    // WHEN: A status command arrives
    let flow = router.handle(Command::position_changed(10));

    // THEN: Nothing happens
    assert_eq!(flow, Flow::Continue);
    assert_eq!(router.state(), PlayerState::Idle);
    assert!(sink.take().is_empty());
}

/// **VALUE**: Verifies playback reaching the end moves to Stopped.
///
/// **WHY THIS MATTERS**: The controller relies on the state change to show the right tray
/// actions.
///
/// **BUG THIS CATCHES**: Would catch a finished event leaving the state as Playing.
#[test]
fn given_playing_when_finished_then_stopped() {
    // GIVEN: Playing
    let (mut router, sink) = playing(5_000);

    // WHEN: The engine reaches the end
    router.on_player_event(PlayerEvent::Finished {
        load: router.load_id(),
    });

    // THEN: Stopped is reported
    assert_eq!(router.state(), PlayerState::Stopped);
    assert_eq!(
        sink.take(),
        vec![Command::playback_state_changed(PlayerState::Stopped)]
    );
}

/// **VALUE**: Verifies engine events from a replaced `setUrl` do not touch the new load.
///
/// **WHY THIS MATTERS**: The startup sync sends the stored url and the user's own `setUrl` can
/// follow right behind it. Both are handled before the engine reports on the first, so its
/// failure or readiness arrives while the second is loading.
///
/// **BUG THIS CATCHES**: Would catch a stale `Failed` moving a healthy load to `Error` (which
/// then ignores the real `Ready`), or a stale `Ready` reporting the old media's duration.
#[test]
fn given_url_replaced_while_loading_when_old_load_reports_then_event_dropped() {
    // GIVEN: Two urls back to back
    let (mut router, sink) = router();
    router.handle(Command::set_url("/missing/old.mp4"));
    let old_load = router.load_id();
    router.handle(Command::set_url("new.mp4"));
    let new_load = router.load_id();
    sink.take();

    // WHEN: The first load fails and reports ready late
    router.on_player_event(PlayerEvent::Failed {
        load: old_load,
        reason: String::from("/missing/old.mp4: no such file"),
    });
    router.on_player_event(ready(old_load, 1_000));

    // THEN: Still loading the second url, nothing reported
    assert_ne!(old_load, new_load);
    assert_eq!(router.state(), PlayerState::Loading);
    assert_eq!(router.duration_ms(), 0);
    assert!(sink.take().is_empty());

    // WHEN: The second load reports ready
    router.on_player_event(ready(new_load, 60_000));

    // THEN: Playing with the new media's duration
    assert_eq!(router.state(), PlayerState::Playing);
    assert_eq!(router.duration_ms(), 60_000);
}

/// **VALUE**: Verifies a `Finished` from the previous media does not stop the current one.
///
/// **WHY THIS MATTERS**: An engine that reaches the end while the next url is opening can
/// deliver the end notice after the new media is already playing.
///
/// **BUG THIS CATCHES**: Would catch a stale `Finished` moving the new media to Stopped.
#[test]
fn given_new_media_playing_when_old_load_finishes_then_keeps_playing() {
    // GIVEN: Playing, then replaced by a second url that is also playing
    let (mut router, sink) = playing(5_000);
    let old_load = router.load_id();
    router.handle(Command::set_url("next.mp4"));
    router.on_player_event(ready(router.load_id(), 8_000));
    sink.take();

    // WHEN
    router.on_player_event(PlayerEvent::Finished { load: old_load });

    // THEN
    assert_eq!(router.state(), PlayerState::Playing);
    assert!(sink.take().is_empty());
}
