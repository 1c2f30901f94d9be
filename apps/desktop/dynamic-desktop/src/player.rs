//! Worker process: dials the launcher's bus and runs the playback router.

use crate::error::DesktopError;
use crate::headless::{CLOCK_TICK, HeadlessPlayer};
use crate::logger::{LogTarget, initialize as LoggerInitialize};
use crate::{EXIT_OK, paths};

use bus_core::channel::config::CONNECT_BACKOFF_BUDGET;
use bus_core::channel::transport::connect_with_backoff;
use bus_core::channel::{ChannelConfig, CommandChannel, Inbox};
use bus_core::cli::StartupOptions;
use bus_core::router::Flow;
use bus_core::router::player::PlayerEvent;
use bus_core::router::worker::WorkerRouter;

use common::ErrorLocation;
use models::{Command, Endpoint, SessionState};

use std::panic::Location;

use log::{error, info, warn};
use tokio::sync::mpsc;

/// Run the player until `quit`, the launcher disconnects for good, or ctrl-c.
pub async fn run(options: StartupOptions) -> i32 {
    if let Err(e) = LoggerInitialize(&paths::log_dir(), LogTarget::Player) {
        eprintln!("{e}");
    }

    if !options.run_from_launcher {
        warn!("Player started without --runfromlauncher, expecting a launcher on the bus anyway");
    }

    match serve_launcher(&options).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    }
}

async fn serve_launcher(options: &StartupOptions) -> Result<(), DesktopError> {
    let (channel, inbox) = CommandChannel::new(Endpoint::Worker, ChannelConfig::default());

    connect_with_backoff(&channel, options.bus_name(), CONNECT_BACKOFF_BUDGET)
        .await
        .map_err(|e| DesktopError::Worker {
            message: format!("Cannot reach the launcher: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let (player, events) = HeadlessPlayer::new();
    let clock = player.spawn_clock(CLOCK_TICK);
    let router = WorkerRouter::new(player, channel.clone());

    event_loop(router, &channel, inbox, events).await;

    clock.abort();
    channel.close();
    info!("Player exiting");
    Ok(())
}

/// Drive `router` from the bus and the engine until it quits or the bus goes away.
pub async fn event_loop(
    mut router: WorkerRouter<HeadlessPlayer, CommandChannel>,
    channel: &CommandChannel,
    mut inbox: Inbox,
    mut events: mpsc::UnboundedReceiver<PlayerEvent>,
) -> WorkerRouter<HeadlessPlayer, CommandChannel> {
    let mut state = channel.subscribe();

    loop {
        let flow = tokio::select! {
            biased;
            command = inbox.recv() => match command {
                Some(command) => router.handle(command),
                None => Flow::Quit,
            },
            Some(event) = events.recv() => router.on_player_event(event),
            changed = state.wait_for(|state| *state == SessionState::Disconnected) => {
                if changed.is_ok() {
                    warn!("Launcher disconnected, shutting down");
                }
                Flow::Quit
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, notifying launcher");
                if let Err(e) = channel.send(Command::quit()) {
                    warn!("Could not notify launcher: {e}");
                }
                Flow::Quit
            }
        };

        if flow == Flow::Quit {
            break;
        }
    }

    router
}
