use crate::helpers::{controller_channel, recv, worker_channel};

use bus_core::channel::transport::{LocalListener, connect_with_backoff, serve};
use bus_core::error::channel::ChannelError;

use models::{Command, SessionState, TypedPayload};

use std::time::Duration;

use uuid::Uuid;

fn unique_bus() -> String {
    format!("dd-test-{}", Uuid::new_v4().simple())
}

/// **VALUE**: Verifies a worker dialing the controller's listener gets a working session.
///
/// **WHY THIS MATTERS**: This is the real transport between launcher and player.
///
/// **BUG THIS CATCHES**: Would catch listener and client disagreeing on the address, or the
/// accepted stream never being attached.
#[tokio::test]
async fn given_listening_controller_when_worker_connects_then_commands_flow_both_ways() {
    // GIVEN: A controller serving a fresh bus
    let bus = unique_bus();
    let (controller, mut controller_inbox) = controller_channel();
    let listener = LocalListener::bind(&bus).expect("Bind should succeed");
    let server = serve(controller.clone(), listener);

    // WHEN: The worker dials
    let (worker, mut worker_inbox) = worker_channel();
    connect_with_backoff(&worker, &bus, Duration::from_secs(5))
        .await
        .expect("Connect should succeed");

    // THEN: Both sides connected, commands flow
    assert!(
        controller
            .wait_for(SessionState::Connected, Duration::from_secs(5))
            .await
    );
    controller.send(Command::play()).expect("Send should succeed");
    assert_eq!(recv(&mut worker_inbox).await, Command::play());

    worker
        .send(Command::echo(TypedPayload::from("ping")))
        .expect("Send should succeed");
    assert_eq!(
        recv(&mut controller_inbox).await,
        Command::echo(TypedPayload::from("ping"))
    );

    controller.close();
    server.await.expect("Serve task should stop after close");
}

/// **VALUE**: Verifies dialing a bus nobody serves fails after the budget and resets the state.
///
/// **WHY THIS MATTERS**: A player started by hand, without a launcher, must exit instead of
/// hanging forever.
///
/// **BUG THIS CATCHES**: Would catch an unbounded retry loop, or the state stuck at
/// `Connecting`.
#[tokio::test]
async fn given_no_listener_when_connect_with_backoff_then_connect_error() {
    // GIVEN: A bus nobody listens on
    let bus = unique_bus();
    let (worker, _inbox) = worker_channel();

    // WHEN: Dialing with a short budget
    let result = connect_with_backoff(&worker, &bus, Duration::from_millis(300)).await;

    // THEN: Connect error, back to Disconnected
    assert!(matches!(result, Err(ChannelError::Connect { .. })));
    assert_eq!(worker.state(), SessionState::Disconnected);
}

/// **VALUE**: Verifies the worker may start dialing before the controller listens.
///
/// **WHY THIS MATTERS**: On a slow machine the player can start before the launcher binds.
///
/// **BUG THIS CATCHES**: Would catch a connect that gives up after the first refusal.
#[tokio::test]
async fn given_listener_bound_late_when_worker_dialing_then_connects() {
    // GIVEN: A worker already dialing
    let bus = unique_bus();
    let (worker, _inbox) = worker_channel();
    let dial_worker = worker.clone();
    let dial_bus = bus.clone();
    let dialing = tokio::spawn(async move {
        connect_with_backoff(&dial_worker, &dial_bus, Duration::from_secs(5)).await
    });

    // WHEN: The controller binds a little later
    tokio::time::sleep(Duration::from_millis(200)).await;
    let (controller, _controller_inbox) = controller_channel();
    let listener = LocalListener::bind(&bus).expect("Bind should succeed");
    let _server = serve(controller.clone(), listener);

    // THEN: Connected
    let result = dialing.await.expect("Dial task panicked");
    assert!(result.is_ok(), "Connect should succeed: {result:?}");
    assert_eq!(worker.state(), SessionState::Connected);
    controller.close();
}
