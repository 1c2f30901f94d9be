use crate::helpers::{connect_pair, controller_channel, spawn_worker, worker_channel};

use bus_core::router::controller::ControllerRouter;
use bus_core::settings::SettingsStore;

use models::{Command, PlayerState, TypedPayload};

use std::time::Duration;

use tempfile::TempDir;

/// **VALUE**: Drives a full controller/worker session over the bus: load, play, volume, quit.
///
/// **WHY THIS MATTERS**: Each piece is tested alone elsewhere. This checks they agree on the
/// vocabulary and ordering end to end.
///
/// **BUG THIS CATCHES**: Would catch status commands the controller cannot apply, volume not
/// clamped by the worker, or quit not ending the worker loop.
#[tokio::test]
async fn given_connected_session_when_url_play_and_volume_sent_then_playing_at_max_volume() {
    // GIVEN: A controller and a worker running its event loop
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (controller, mut controller_inbox) = controller_channel();
    let (worker, worker_inbox) = worker_channel();
    let mut router =
        ControllerRouter::new(controller.clone(), SettingsStore::with_defaults(dir.path()));
    let worker_task = spawn_worker(worker.clone(), worker_inbox, 30_000);
    connect_pair(&controller, &worker);

    // WHEN: Loading, playing and setting an out-of-range volume
    router.set_url("video.mp4");
    router.play();
    controller
        .send(Command::set_volume(150))
        .expect("Send should succeed");
    router.echo(TypedPayload::from("barrier"));

    // THEN: The UI sees Playing, and the echo confirms setVolume was handled
    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(command) = controller_inbox.recv().await {
            router.handle(command);
            let ui = router.ui();
            if ui.playback == PlayerState::Playing && ui.last_echo.is_some() {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);
    assert!(settled, "Worker never reported Playing");
    assert_eq!(router.ui().duration_ms, 30_000);

    // WHEN: Quitting
    router.quit();
    let worker_router = tokio::time::timeout(Duration::from_secs(5), worker_task)
        .await
        .expect("Worker should stop after quit")
        .expect("Worker task panicked");

    // THEN: Worker ended Playing at volume 99
    assert!(worker_router.has_quit());
    assert_eq!(worker_router.state(), PlayerState::Playing);
    assert_eq!(worker_router.volume(), Some(99));
    assert_eq!(worker_router.player().volume, Some(99));
    assert_eq!(router.settings().url(), "video.mp4");
}
