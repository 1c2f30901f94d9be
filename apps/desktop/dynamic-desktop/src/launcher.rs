//! Controller process: single instance, preferences, the player's lifecycle and the
//! console front-end.
//!
//! # Startup
//!
//! 1. Logger, then the OS version check (`-1` when too old)
//! 2. Instance lock; a second launcher exits with `0`
//! 3. Settings loaded and overridden by the command line
//! 4. Bus bound and the settings sync queued, so it is the first thing the player reads
//! 5. Player spawned and given [`WORKER_CONNECT_TIMEOUT`] to connect (`-2` otherwise)
//!
//! # Shutdown
//!
//! `quit` is sent unless the player asked first, the player gets
//! [`QUIT_GRACE_PERIOD`] to exit on its own and is then killed by image name.
//! Settings are flushed last.

use crate::console::{self, ConsoleAction, HELP};
use crate::error::DesktopError;
use crate::logger::{LogTarget, initialize as LoggerInitialize};
use crate::{EXIT_OK, EXIT_WORKER_FAILED, paths};

use bus_core::channel::transport::{LocalListener, serve};
use bus_core::channel::{ChannelConfig, CommandChannel, Inbox};
use bus_core::cli::StartupOptions;
use bus_core::error::CoreError;
use bus_core::error::instance::InstanceError;
use bus_core::error::spawn::SpawnError;
use bus_core::instance::{InstanceLock, LAUNCHER_INSTANCE_NAME};
use bus_core::router::controller::{ControllerRouter, UiState};
use bus_core::router::{CommandSink, Flow};
use bus_core::settings::SettingsStore;
use bus_core::supervisor::autostart::{
    AUTOSTART_HELPER_EXECUTABLE, AUTOSTART_SERVICE_NAME, AUTOSTART_SETTLE_DELAY, set_autostart,
};
use bus_core::supervisor::spawn::{resolve_sibling_executable, resolve_worker_executable};
use bus_core::supervisor::{ProcessHandle, ProcessSupervisor, SystemSupervisor};
use bus_core::{MAX_WORKER_RESTARTS, QUIT_GRACE_PERIOD, WORKER_CONNECT_TIMEOUT};

use common::ErrorLocation;
use models::{Endpoint, SessionState, TrackKind, TypedPayload};

use std::panic::Location;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

/// Oldest supported Windows kernel: 6.1.7600 (Windows 7).
const MIN_WINDOWS_KERNEL: (u32, u32, u32) = (6, 1, 7600);

const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DISCONNECT_SETTLE: Duration = Duration::from_secs(2);

/// What the event loop does after a console action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Handled,
    Quit,
    Autostart(bool),
    Status,
    Help,
}

/// Run the launcher to completion and return the process exit code.
pub async fn run(options: StartupOptions) -> i32 {
    if let Err(e) = LoggerInitialize(&paths::log_dir(), LogTarget::Launcher) {
        eprintln!("{e}");
    }

    info!("Dynamic Desktop launcher starting");

    if let Err(e) = check_os_version() {
        notify_fatal(&e);
        return e.exit_code();
    }

    let _instance = match InstanceLock::acquire(LAUNCHER_INSTANCE_NAME) {
        Ok(lock) => Some(lock),
        Err(InstanceError::AlreadyRunning { .. }) => {
            eprintln!("There is another instance running. Please do not run twice.");
            info!("Another launcher owns the instance lock, exiting");
            return EXIT_OK;
        }
        Err(e) => {
            warn!("Instance lock unavailable, continuing without it: {e}");
            None
        }
    };

    match Launcher::start(&options, SystemSupervisor).await {
        Ok(launcher) => launcher.run().await,
        Err(e) => {
            notify_fatal(&e);
            e.exit_code()
        }
    }
}

fn notify_fatal(e: &DesktopError) {
    error!("{e}");
    eprintln!("Dynamic Desktop cannot continue: {e}");
}

#[track_caller]
fn check_os_version() -> Result<(), DesktopError> {
    if !cfg!(windows) {
        return Ok(());
    }

    let kernel = sysinfo::System::kernel_version().unwrap_or_default();
    debug!("Kernel version: {kernel}");

    if is_supported_windows_kernel(&kernel) {
        Ok(())
    } else {
        Err(DesktopError::UnsupportedOs {
            message: format!("This application only supports Windows 7 and newer (kernel {kernel})"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// `true` unless `kernel` parses as a Windows version older than 6.1.7600.
///
/// Accepts `major.minor.build` or a bare build number. Unparseable input is allowed.
pub fn is_supported_windows_kernel(kernel: &str) -> bool {
    let parts: Vec<u32> = kernel
        .split('.')
        .map_while(|part| part.trim().parse().ok())
        .collect();

    match parts.as_slice() {
        [major, minor, build, ..] => (*major, *minor, *build) >= MIN_WINDOWS_KERNEL,
        [build] => *build >= MIN_WINDOWS_KERNEL.2,
        _ => true,
    }
}

/// Apply one console action to the controller router.
pub fn dispatch<S: CommandSink>(
    router: &mut ControllerRouter<S>,
    action: ConsoleAction,
) -> ActionOutcome {
    match action {
        ConsoleAction::Play => router.play(),
        ConsoleAction::Pause => router.pause(),
        ConsoleAction::Stop => router.stop(),
        ConsoleAction::Seek(position_ms) => router.seek(position_ms),
        ConsoleAction::Volume(volume) => router.set_volume(volume),
        ConsoleAction::Mute(mute) => router.set_mute(mute),
        ConsoleAction::Url(url) => router.set_url(&url),
        ConsoleAction::Track(kind, id) => router.select_track(kind, id),
        ConsoleAction::SubtitleFile(path) => router.open_subtitle(&path),
        ConsoleAction::AudioFile(path) => router.open_audio(&path),
        ConsoleAction::Charset(charset) => router.set_charset(&charset),
        ConsoleAction::SubtitleAutoLoad(enabled) => router.set_subtitle_auto_load(enabled),
        ConsoleAction::SubtitlesEnabled(enabled) => router.set_subtitle_enabled(enabled),
        ConsoleAction::Renderer(renderer) => router.set_renderer(renderer),
        ConsoleAction::Quality(quality) => router.set_image_quality(quality),
        ConsoleAction::Fit(fit) => router.set_fit_desktop(fit),
        ConsoleAction::Echo(text) => router.echo(TypedPayload::from(text)),
        ConsoleAction::Autostart(enable) => return ActionOutcome::Autostart(enable),
        ConsoleAction::Status => return ActionOutcome::Status,
        ConsoleAction::Help => return ActionOutcome::Help,
        ConsoleAction::Quit => return ActionOutcome::Quit,
    }
    ActionOutcome::Handled
}

/// One-line summary of the player for the console.
pub fn format_status(ui: &UiState, settings: &SettingsStore) -> String {
    let track_count = |kind: TrackKind| ui.tracks(kind).len();
    format!(
        "{state} {position}/{duration} ms | volume {volume}{mute} | tracks v{video} a{audio} s{subtitle} | {url}",
        state = ui.playback,
        position = ui.position_ms,
        duration = ui.duration_ms,
        volume = settings.volume(),
        mute = if settings.mute() { " (muted)" } else { "" },
        video = track_count(TrackKind::Video),
        audio = track_count(TrackKind::Audio),
        subtitle = track_count(TrackKind::Subtitle),
        url = settings.url(),
    )
}

struct Launcher<P: ProcessSupervisor> {
    supervisor: P,
    channel: CommandChannel,
    inbox: Inbox,
    router: ControllerRouter<CommandChannel>,
    server: JoinHandle<()>,
    worker_path: PathBuf,
    worker_args: Vec<String>,
    worker: ProcessHandle,
}

impl<P: ProcessSupervisor> Launcher<P> {
    async fn start(options: &StartupOptions, supervisor: P) -> Result<Self, DesktopError> {
        let mut settings = SettingsStore::load_or_default(&paths::settings_dir());
        options.apply_to(&mut settings);

        let registered = supervisor.is_autostart_registered(AUTOSTART_SERVICE_NAME);
        if settings.autostart() != registered {
            debug!("Autostart setting follows the service registration: {registered}");
            settings.set_autostart(registered);
        }

        let (channel, inbox) = CommandChannel::new(Endpoint::Controller, ChannelConfig::default());
        let listener = LocalListener::bind(options.bus_name()).map_err(CoreError::from)?;
        let server = serve(channel.clone(), listener);

        let router = ControllerRouter::new(channel.clone(), settings);
        router.sync_worker();

        let worker_path = resolve_worker_executable().map_err(CoreError::from)?;
        let worker_args = options.worker_args();
        let worker = supervisor
            .spawn(&worker_path, &worker_args)
            .await
            .map_err(CoreError::from)?;

        if !channel
            .wait_for(SessionState::Connected, WORKER_CONNECT_TIMEOUT)
            .await
        {
            channel.close();
            supervisor.terminate_by_name(worker.image_name()).await;
            return Err(CoreError::from(SpawnError::Timeout {
                message: format!(
                    "{} did not connect within {WORKER_CONNECT_TIMEOUT:?}",
                    worker.image_name()
                ),
                location: ErrorLocation::from(Location::caller()),
            })
            .into());
        }

        info!("Player {} connected", worker.pid());
        Ok(Self {
            supervisor,
            channel,
            inbox,
            router,
            server,
            worker_path,
            worker_args,
            worker,
        })
    }

    async fn run(mut self) -> i32 {
        let exit_code = self.event_loop().await;
        self.shutdown().await;
        exit_code
    }

    async fn event_loop(&mut self) -> i32 {
        let mut lines = console::spawn_reader();
        let mut console_open = true;
        let mut restarts = 0u32;

        println!("Type 'help' for commands");

        loop {
            tokio::select! {
                biased;
                command = self.inbox.recv() => match command {
                    Some(command) => {
                        if self.router.handle(command) == Flow::Quit {
                            info!("Player asked to quit");
                            return EXIT_OK;
                        }
                    }
                    None => return EXIT_OK,
                },
                line = lines.recv(), if console_open => match line {
                    Some(line) => {
                        if self.on_console_line(&line).await == Flow::Quit {
                            return EXIT_OK;
                        }
                    }
                    None => console_open = false,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    return EXIT_OK;
                }
                _ = self.worker.wait_for_exit(WORKER_POLL_INTERVAL) => {
                    if self.channel.received_quit() {
                        info!("Player exited after asking to quit");
                        return EXIT_OK;
                    }
                    restarts += 1;
                    if restarts > MAX_WORKER_RESTARTS {
                        error!("Player keeps exiting, giving up after {MAX_WORKER_RESTARTS} restarts");
                        return EXIT_WORKER_FAILED;
                    }
                    warn!("Player exited unexpectedly, restarting ({restarts}/{MAX_WORKER_RESTARTS})");
                    if let Err(e) = self.restart_worker().await {
                        error!("{e}");
                        return EXIT_WORKER_FAILED;
                    }
                }
            }
        }
    }

    async fn on_console_line(&mut self, line: &str) -> Flow {
        let action = match line.parse::<ConsoleAction>() {
            Ok(action) => action,
            Err(e) => {
                println!("{e}");
                return Flow::Continue;
            }
        };

        match dispatch(&mut self.router, action) {
            ActionOutcome::Handled => {}
            ActionOutcome::Quit => return Flow::Quit,
            ActionOutcome::Autostart(enable) => self.toggle_autostart(enable).await,
            ActionOutcome::Status => {
                println!("{}", format_status(self.router.ui(), self.router.settings()))
            }
            ActionOutcome::Help => println!("{HELP}"),
        }
        Flow::Continue
    }

    async fn toggle_autostart(&mut self, enable: bool) {
        let helper = match resolve_sibling_executable(AUTOSTART_HELPER_EXECUTABLE) {
            Ok(helper) => helper,
            Err(e) => {
                warn!("Autostart helper unavailable: {e}");
                return;
            }
        };

        match set_autostart(&self.supervisor, &helper, enable, AUTOSTART_SETTLE_DELAY).await {
            Ok(registered) => {
                self.router.settings_mut().set_autostart(registered);
                println!("autostart {}", if registered { "on" } else { "off" });
            }
            Err(e) => warn!("Autostart change failed: {e}"),
        }
    }

    /// Queue the settings sync for the next session, then spawn a new player.
    async fn restart_worker(&mut self) -> Result<(), DesktopError> {
        if !self
            .channel
            .wait_for(SessionState::Disconnected, DISCONNECT_SETTLE)
            .await
        {
            warn!("Session still up after the player exited");
        }

        // The sync carries the latest settings; backlog entries it names are stale.
        if let Err(e) = self.channel.resync(self.router.sync_commands()) {
            warn!("Settings sync not queued: {e}");
        }

        self.worker = self
            .supervisor
            .spawn(&self.worker_path, &self.worker_args)
            .await
            .map_err(CoreError::from)?;

        if !self
            .channel
            .wait_for(SessionState::Connected, WORKER_CONNECT_TIMEOUT)
            .await
        {
            return Err(CoreError::from(SpawnError::Timeout {
                message: format!("Restarted player did not connect within {WORKER_CONNECT_TIMEOUT:?}"),
                location: ErrorLocation::from(Location::caller()),
            })
            .into());
        }

        info!("Player {} reconnected", self.worker.pid());
        Ok(())
    }

    async fn shutdown(mut self) {
        if !self.router.ui().worker_quit {
            self.router.quit();
        }

        let exited = tokio::time::timeout(
            QUIT_GRACE_PERIOD,
            self.worker.wait_for_exit(WORKER_POLL_INTERVAL),
        )
        .await
        .is_ok();

        if !exited {
            warn!("Player still running after {QUIT_GRACE_PERIOD:?}, terminating");
            let image_name = self.worker.image_name().to_string();
            if !self.supervisor.terminate_by_name(&image_name).await {
                debug!("No {image_name} process left to terminate");
            }
        }

        self.channel.close();
        if let Err(e) = self.server.await {
            debug!("Bus server task ended abnormally: {e}");
        }

        if let Err(e) = self.router.settings_mut().flush() {
            error!("Failed to save settings: {e}");
        }

        info!("Launcher exiting");
    }
}
