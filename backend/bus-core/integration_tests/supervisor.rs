use bus_core::error::spawn::SpawnError;
use bus_core::supervisor::{ProcessSupervisor, SystemSupervisor};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// **VALUE**: Verifies spawning a missing executable fails with `NotFound`.
///
/// **WHY THIS MATTERS**: The launcher maps this to its "player is missing" exit code.
///
/// **BUG THIS CATCHES**: Would catch a missing file reported as a generic spawn failure.
#[tokio::test]
async fn given_missing_executable_when_spawned_then_not_found() {
    // GIVEN: A path that does not exist
    let executable = Path::new("/nonexistent/dynamic-desktop/player");

    // WHEN: Spawning
    let result = SystemSupervisor.spawn(executable, &[]).await;

    // THEN: NotFound with the path
    match result {
        Err(SpawnError::NotFound { path, .. }) => assert_eq!(path, executable),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

/// **VALUE**: Verifies a spawned process is tracked until it exits.
///
/// **WHY THIS MATTERS**: The controller restarts the worker when it exits unexpectedly, which
/// depends on exit being observed.
///
/// **BUG THIS CATCHES**: Would catch `wait_for_exit` never resolving or `is_alive` stuck true.
#[cfg(unix)]
#[tokio::test]
async fn given_short_lived_process_when_spawned_then_exit_observed() {
    // GIVEN: A shell that exits immediately
    let executable = Path::new("/bin/sh");
    let args = vec!["-c".to_string(), "exit 0".to_string()];

    // WHEN: Spawning and waiting
    let mut handle = SystemSupervisor
        .spawn(executable, &args)
        .await
        .expect("Spawn should succeed");
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for_exit(Duration::from_millis(50)))
        .await
        .expect("Process should exit");

    // THEN: Not alive, image name recorded
    assert!(handle.pid() > 0);
    assert_eq!(handle.image_name(), "sh");
    assert!(!handle.is_alive());
}

/// **VALUE**: Verifies terminating a worker leaves the async runtime free to run other tasks.
///
/// **WHY THIS MATTERS**: Termination scans every process and then waits up to two seconds for
/// the victim to disappear. The launcher calls it from its event loop during shutdown and
/// failed startups, where the bus and the console must keep being served.
///
/// **BUG THIS CATCHES**: Would catch the process scan or the kill-verify sleep running on the
/// runtime thread, which starves every other task on a single-threaded runtime.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn given_running_process_when_terminated_by_name_then_runtime_keeps_ticking() {
    // GIVEN: A long sleep under a name no other process uses
    let dir = tempfile::tempdir().expect("Temp dir should be created");
    let image_name = format!("ddk{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let executable = dir.path().join(&image_name);
    std::fs::copy("/bin/sleep", &executable).expect("Copying sleep should succeed");
    let mut handle = SystemSupervisor
        .spawn(&executable, &["30".to_string()])
        .await
        .expect("Spawn should succeed");
    tokio::time::sleep(Duration::from_millis(100)).await;
    if !handle.is_alive() {
        // Multi-call sleep binaries refuse to run under another name.
        return;
    }

    // WHEN: Terminating while another task ticks on the same runtime
    let ticks = Arc::new(AtomicU32::new(0));
    let ticker = tokio::spawn({
        let ticks = Arc::clone(&ticks);
        async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        }
    });
    let killed = SystemSupervisor.terminate_by_name(&image_name).await;
    ticker.abort();

    // THEN: Killed, and the ticker ran meanwhile
    assert!(killed, "{image_name} should have been found and killed");
    assert!(
        ticks.load(Ordering::SeqCst) > 0,
        "Runtime was blocked during termination"
    );
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for_exit(Duration::from_millis(50)))
        .await
        .expect("Killed process should be reaped");
}
