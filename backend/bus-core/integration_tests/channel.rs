use crate::helpers::{connect_pair, controller_channel, recv, stays_empty, worker_channel};

use bus_core::channel::codec::encode_command;
use bus_core::channel::{ChannelConfig, CommandChannel, PendingPolicy, SendOutcome};
use bus_core::error::channel::ChannelError;

use models::{Command, Endpoint, SessionState, WireCommand};

use std::time::Duration;

use prost::Message;
use tokio::io::AsyncWriteExt;

/// **VALUE**: Verifies a command sent before the peer connects is delivered exactly once.
///
/// **WHY THIS MATTERS**: The launcher queues the initial sync before the player has even
/// started. Losing it leaves the wallpaper blank; duplicating it reloads the media.
///
/// **BUG THIS CATCHES**: Would catch pending commands dropped on attach, or flushed twice.
#[tokio::test]
async fn given_play_sent_before_attach_when_peer_attaches_then_delivered_once() {
    // GIVEN: A controller with no peer
    let (controller, _controller_inbox) = controller_channel();
    let (worker, mut worker_inbox) = worker_channel();

    // WHEN: Sending play, then connecting
    let outcome = controller.send(Command::play()).expect("Send should succeed");
    assert_eq!(outcome, SendOutcome::Queued);
    assert_eq!(controller.pending_len(), 1);
    connect_pair(&controller, &worker);

    // THEN: Exactly one play
    assert_eq!(recv(&mut worker_inbox).await, Command::play());
    assert!(stays_empty(&mut worker_inbox).await, "play delivered twice");
    assert_eq!(controller.pending_len(), 0);
    assert_eq!(controller.state(), SessionState::Connected);
}

/// **VALUE**: Verifies commands arrive in send order, including across the attach boundary.
///
/// **WHY THIS MATTERS**: `setUrl` followed by `seek` is meaningless in the other order.
///
/// **BUG THIS CATCHES**: Would catch commands sent right after attach overtaking the flushed
/// backlog.
#[tokio::test]
async fn given_commands_before_and_after_attach_when_received_then_in_send_order() {
    // GIVEN: Some commands queued while disconnected
    let (controller, _controller_inbox) = controller_channel();
    let (worker, mut worker_inbox) = worker_channel();
    for position in 0..5 {
        controller.send(Command::seek(position)).expect("Send should succeed");
    }

    // WHEN: Connecting and sending more
    connect_pair(&controller, &worker);
    for position in 5..50 {
        let outcome = controller.send(Command::seek(position)).expect("Send should succeed");
        assert_eq!(outcome, SendOutcome::Written);
    }

    // THEN: 0..50 in order
    for expected in 0..50 {
        assert_eq!(recv(&mut worker_inbox).await, Command::seek(expected));
    }
}

/// **VALUE**: Verifies quit is delivered and every later send is rejected with `Closed`.
///
/// **WHY THIS MATTERS**: After quit the session is ending. Accepting more commands would
/// silently lose them.
///
/// **BUG THIS CATCHES**: Would catch sends after quit being queued or written.
#[tokio::test]
async fn given_quit_sent_when_sending_again_then_closed() {
    // GIVEN: A connected pair
    let (controller, _controller_inbox) = controller_channel();
    let (worker, mut worker_inbox) = worker_channel();
    connect_pair(&controller, &worker);

    // WHEN: Sending quit, then play
    controller.send(Command::quit()).expect("Quit should be accepted");
    let after = controller.send(Command::play());

    // THEN: Quit arrives, play rejected
    assert!(matches!(after, Err(ChannelError::Closed { .. })));
    assert!(controller.is_closing());
    assert_eq!(recv(&mut worker_inbox).await, Command::quit());
    assert!(worker.received_quit());
}

/// **VALUE**: Verifies quit sent while disconnected discards the backlog and goes out alone.
///
/// **WHY THIS MATTERS**: A worker that connects only to be told to quit must not first load
/// media from a stale sync.
///
/// **BUG THIS CATCHES**: Would catch pending commands flushed ahead of a queued quit.
#[tokio::test]
async fn given_backlog_when_quit_queued_then_only_quit_delivered() {
    // GIVEN: A backlog while disconnected
    let (controller, _controller_inbox) = controller_channel();
    let (worker, mut worker_inbox) = worker_channel();
    controller.send(Command::set_url("video.mp4")).expect("Send should succeed");
    controller.send(Command::play()).expect("Send should succeed");

    // WHEN: Quit, then connect
    let outcome = controller.send(Command::quit()).expect("Quit should be accepted");
    connect_pair(&controller, &worker);

    // THEN: Only quit
    assert_eq!(outcome, SendOutcome::Queued);
    assert_eq!(recv(&mut worker_inbox).await, Command::quit());
    assert!(stays_empty(&mut worker_inbox).await);
}

/// **VALUE**: Verifies peer loss moves the session to `Disconnected` and later sends queue
/// until the next peer attaches.
///
/// **WHY THIS MATTERS**: A crashed worker is restarted by the controller. Commands issued
/// meanwhile must reach the replacement.
///
/// **BUG THIS CATCHES**: Would catch sends still handed to a dead writer, or a session stuck
/// in `Connected`.
#[tokio::test]
async fn given_peer_dropped_when_sending_then_queued_for_next_peer() {
    // GIVEN: A connected controller whose peer goes away
    let (controller, _controller_inbox) = controller_channel();
    let (peer_end, controller_end) = tokio::io::duplex(4096);
    controller.attach(controller_end).expect("Attach should succeed");
    drop(peer_end);

    // WHEN: The loss is observed, then pause is sent
    assert!(
        controller
            .wait_for(SessionState::Disconnected, Duration::from_secs(5))
            .await,
        "Session should drop to Disconnected"
    );
    let outcome = controller.send(Command::pause()).expect("Send should succeed");

    // THEN: Queued, then delivered to the next worker
    assert_eq!(outcome, SendOutcome::Queued);
    let (worker, mut worker_inbox) = worker_channel();
    connect_pair(&controller, &worker);
    assert_eq!(recv(&mut worker_inbox).await, Command::pause());
}

/// **VALUE**: Verifies the fail-fast policy rejects sends while disconnected.
///
/// **WHY THIS MATTERS**: Callers that prefer an immediate error over buffering must get one.
///
/// **BUG THIS CATCHES**: Would catch the policy being ignored.
#[tokio::test]
async fn given_fail_fast_policy_when_sending_disconnected_then_disconnected_error() {
    // GIVEN: A fail-fast channel
    let config = ChannelConfig {
        pending_policy: PendingPolicy::FailFast,
        ..ChannelConfig::default()
    };
    let (controller, _inbox) = CommandChannel::new(Endpoint::Controller, config);

    // WHEN: Sending with no peer
    let result = controller.send(Command::play());

    // THEN: Rejected, nothing queued
    assert!(matches!(result, Err(ChannelError::Disconnected { .. })));
    assert_eq!(controller.pending_len(), 0);
}

/// **VALUE**: Verifies a frame with an unknown command name is dropped and the stream keeps
/// working.
///
/// **WHY THIS MATTERS**: A newer launcher may send commands an older player does not know.
/// The session must survive them.
///
/// **BUG THIS CATCHES**: Would catch the reader closing the session on a malformed command.
#[tokio::test]
async fn given_unknown_command_frame_when_received_then_dropped_and_next_delivered() {
    // GIVEN: A worker attached to a raw stream
    let (worker, mut worker_inbox) = worker_channel();
    let (mut raw, worker_end) = tokio::io::duplex(4096);
    worker.attach(worker_end).expect("Attach should succeed");

    // WHEN: Writing an unknown command, then a valid one
    let unknown = WireCommand {
        name: "rewind".to_string(),
        sequence: 1,
        payload: None,
    }
    .encode_to_vec();
    let valid = encode_command(&Command::stop(), 2).expect("Encoding should succeed");
    for body in [&unknown[..], &valid[..]] {
        raw.write_u32(body.len() as u32).await.expect("Write failed");
        raw.write_all(body).await.expect("Write failed");
    }

    // THEN: Only stop arrives, session still up
    assert_eq!(recv(&mut worker_inbox).await, Command::stop());
    assert_eq!(worker.state(), SessionState::Connected);
}

/// **VALUE**: Verifies a second attach while connected is refused.
///
/// **WHY THIS MATTERS**: There is exactly one worker per controller. A stray second player
/// must not hijack the session.
///
/// **BUG THIS CATCHES**: Would catch the second stream replacing the first.
#[tokio::test]
async fn given_connected_channel_when_attached_again_then_already_connected() {
    // GIVEN: A connected pair
    let (controller, _controller_inbox) = controller_channel();
    let (worker, _worker_inbox) = worker_channel();
    connect_pair(&controller, &worker);

    // WHEN: Attaching another stream
    let (extra, _other) = tokio::io::duplex(64);
    let result = controller.attach(extra);

    // THEN: Refused
    assert!(matches!(result, Err(ChannelError::AlreadyConnected { .. })));
}

/// **VALUE**: Verifies `close` stops the session and rejects further attaches and sends.
///
/// **WHY THIS MATTERS**: Shutdown must not leave reader or writer tasks running.
///
/// **BUG THIS CATCHES**: Would catch a closed channel accepting a new peer.
#[tokio::test]
async fn given_closed_channel_when_attach_or_send_then_closed() {
    // GIVEN: A closed controller
    let (controller, _inbox) = controller_channel();
    controller.close();

    // WHEN
    let (stream, _other) = tokio::io::duplex(64);
    let attach = controller.attach(stream);
    let send = controller.send(Command::play());

    // THEN
    assert!(matches!(attach, Err(ChannelError::Closed { .. })));
    assert!(matches!(send, Err(ChannelError::Closed { .. })));
    assert_eq!(controller.state(), SessionState::Disconnected);
}

/// **VALUE**: Verifies a frame cut off by the peer going away is never delivered.
///
/// **WHY THIS MATTERS**: A player that crashes mid-write leaves half a command on the stream.
/// Decoding the fragment could turn a truncated `setUrl` into a load of the wrong path.
///
/// **BUG THIS CATCHES**: Would catch the reader handing a partial body to the decoder at EOF,
/// or a session left `Connected` after the peer vanished.
#[tokio::test]
async fn given_truncated_frame_when_peer_drops_then_nothing_delivered_and_disconnected() {
    // GIVEN: A worker attached to a raw stream
    let (worker, mut worker_inbox) = worker_channel();
    let (mut raw, worker_end) = tokio::io::duplex(4096);
    worker.attach(worker_end).expect("Attach should succeed");

    // WHEN: A length prefix and only half the body are written, then the writer drops
    let body = encode_command(&Command::set_url("/videos/rain.mp4"), 1)
        .expect("Encoding should succeed");
    let mut fragment = (body.len() as u32).to_be_bytes().to_vec();
    fragment.extend_from_slice(&body[..body.len() / 2]);
    raw.write_all(&fragment).await.expect("Write failed");
    drop(raw);

    // THEN: The session ends and the fragment never reaches the inbox
    assert!(
        worker
            .wait_for(SessionState::Disconnected, Duration::from_secs(5))
            .await,
        "Session should drop to Disconnected"
    );
    assert!(stays_empty(&mut worker_inbox).await, "Partial frame delivered");
}

/// **VALUE**: Verifies a frame above the configured maximum ends the session undelivered.
///
/// **WHY THIS MATTERS**: The length prefix is read before the body. Honouring an oversized
/// prefix would let a corrupt stream make the reader buffer without bound.
///
/// **BUG THIS CATCHES**: Would catch the frame limit not being applied to incoming frames, or
/// the reader skipping the frame and carrying on with a desynchronised stream.
#[tokio::test]
async fn given_oversized_frame_when_received_then_session_ends_without_delivery() {
    // GIVEN: A worker with a small frame limit, attached to a raw stream kept open
    let config = ChannelConfig {
        max_frame_length: 64,
        ..ChannelConfig::default()
    };
    let (worker, mut worker_inbox) = CommandChannel::new(Endpoint::Worker, config);
    let (mut raw, worker_end) = tokio::io::duplex(4096);
    worker.attach(worker_end).expect("Attach should succeed");

    // WHEN: A frame larger than the limit arrives, followed by a valid small one
    let oversized = encode_command(&Command::set_url("x".repeat(200)), 1)
        .expect("Encoding should succeed");
    let small = encode_command(&Command::play(), 2).expect("Encoding should succeed");
    assert!(oversized.len() > 64);
    let mut stream = Vec::new();
    for body in [&oversized[..], &small[..]] {
        stream.extend_from_slice(&(body.len() as u32).to_be_bytes());
        stream.extend_from_slice(body);
    }
    raw.write_all(&stream).await.expect("Write failed");

    // THEN: The session ends and neither command is delivered
    assert!(
        worker
            .wait_for(SessionState::Disconnected, Duration::from_secs(5))
            .await,
        "Session should drop to Disconnected"
    );
    assert!(stays_empty(&mut worker_inbox).await, "Command delivered");
    drop(raw);
}

/// **VALUE**: Verifies a resync sent while disconnected reaches the next peer before the
/// backlog, with only one `setUrl`.
///
/// **WHY THIS MATTERS**: When the player crashes, commands the user sends before the
/// restart wait in the backlog. The restarted player must get the saved settings first and
/// load the media once, then apply the user's later commands.
///
/// **BUG THIS CATCHES**: Would catch the sync flushed after the backlog, or a queued
/// `setUrl` delivered alongside the sync's own.
#[tokio::test]
async fn given_backlog_when_resync_then_next_peer_gets_sync_first_and_one_set_url() {
    // GIVEN: A disconnected controller holding setUrl then play
    let (controller, _controller_inbox) = controller_channel();
    controller
        .send(Command::set_url("file:///media/loop.mp4"))
        .expect("Send should succeed");
    controller.send(Command::play()).expect("Send should succeed");

    // WHEN: The settings sync is queued, then a worker connects
    let outcome = controller
        .resync(vec![
            Command::set_mute(false),
            Command::set_url("file:///media/loop.mp4"),
        ])
        .expect("Resync should succeed");
    assert_eq!(outcome, SendOutcome::Queued);
    assert_eq!(controller.pending_len(), 3);
    let (worker, mut worker_inbox) = worker_channel();
    connect_pair(&controller, &worker);

    // THEN: Sync first, one setUrl, then the user's play
    assert_eq!(recv(&mut worker_inbox).await, Command::set_mute(false));
    assert_eq!(
        recv(&mut worker_inbox).await,
        Command::set_url("file:///media/loop.mp4")
    );
    assert_eq!(recv(&mut worker_inbox).await, Command::play());
    assert!(stays_empty(&mut worker_inbox).await, "setUrl delivered twice");
}

/// **VALUE**: Verifies a resync after quit is rejected like any other send.
///
/// **WHY THIS MATTERS**: A player exit caused by quit must not be followed by a settings
/// sync that would keep the channel busy during shutdown.
///
/// **BUG THIS CATCHES**: Would catch resync bypassing the closing check.
#[tokio::test]
async fn given_quit_sent_when_resync_then_closed() {
    // GIVEN: A controller that already sent quit
    let (controller, _controller_inbox) = controller_channel();
    controller.send(Command::quit()).expect("Quit should queue");

    // WHEN: Resyncing
    let result = controller.resync(vec![Command::set_volume(20)]);

    // THEN: Closed
    assert!(matches!(result, Err(ChannelError::Closed { .. })));
}
