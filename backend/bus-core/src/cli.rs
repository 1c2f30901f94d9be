//! Startup options shared by the launcher and the player.
//!
//! Unknown flags are dropped before parsing so a stray argument never aborts startup,
//! and invalid values are logged and ignored.

use crate::channel::config::DEFAULT_BUS_NAME;
use crate::settings::SettingsStore;
use crate::supervisor::RUN_FROM_LAUNCHER_FLAG;

use models::{ImageQuality, MAX_VOLUME, Renderer};

use std::ffi::OsString;

use clap::Parser;
use log::{debug, warn};

const FLAGS: [&str; 2] = ["--runfromlauncher", "--window"];
const VALUE_OPTIONS: [&str; 6] = [
    "--skin",
    "--url",
    "--quality",
    "--renderer",
    "--volume",
    "--bus",
];
const LAUNCH_FLAG: &str = "--launch";

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "dynamic-desktop", about = "Video wallpaper launcher and player")]
pub struct StartupOptions {
    /// Started by the launcher (player only)
    #[arg(long = "runfromlauncher")]
    pub run_from_launcher: bool,

    /// Show the player in a normal window instead of behind the desktop icons
    #[arg(long)]
    pub window: bool,

    /// Skin name
    #[arg(long)]
    pub skin: Option<String>,

    /// Media file or URL to play
    #[arg(long)]
    pub url: Option<String>,

    /// Image quality: default, best or fastest
    #[arg(long)]
    pub quality: Option<String>,

    /// Renderer: opengl, gl, qt, gdi or d2d
    #[arg(long)]
    pub renderer: Option<String>,

    /// Volume, clamped to 0-99
    #[arg(long, allow_hyphen_values = true)]
    pub volume: Option<String>,

    /// Launch directly without an update check (there is none)
    #[arg(long)]
    pub launch: bool,

    /// Command bus name
    #[arg(long)]
    pub bus: Option<String>,
}

impl StartupOptions {
    /// Parse `args` (including the program name), ignoring anything unrecognised.
    pub fn parse_lenient<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let filtered = filter_known(args.into_iter().map(Into::into));

        match Self::try_parse_from(filtered) {
            Ok(options) => options,
            Err(e) => {
                warn!("Ignoring command line: {e}");
                Self::default()
            }
        }
    }

    pub fn bus_name(&self) -> &str {
        self.bus.as_deref().unwrap_or(DEFAULT_BUS_NAME)
    }

    pub fn image_quality(&self) -> Option<ImageQuality> {
        let value = self.quality.as_deref()?;
        value
            .parse()
            .map_err(|e| warn!("Ignoring --quality: {e}"))
            .ok()
    }

    pub fn renderer(&self) -> Option<Renderer> {
        let value = self.renderer.as_deref()?;
        value
            .parse()
            .map_err(|e| warn!("Ignoring --renderer: {e}"))
            .ok()
    }

    /// Requested volume clamped to `0..=99`. Non-numeric values are ignored.
    pub fn volume(&self) -> Option<u32> {
        let value = self.volume.as_deref()?;
        match value.trim().parse::<i64>() {
            Ok(volume) => Some(volume.clamp(0, i64::from(MAX_VOLUME)) as u32),
            Err(e) => {
                warn!("Ignoring --volume '{value}': {e}");
                None
            }
        }
    }

    /// Persist the recognised options as preferences.
    pub fn apply_to(&self, settings: &mut SettingsStore) {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            settings.set_url(url);
        }
        if let Some(skin) = self.skin.as_deref().filter(|s| !s.trim().is_empty()) {
            settings.set_skin(skin);
        }
        if let Some(quality) = self.image_quality() {
            settings.set_image_quality(quality);
        }
        if let Some(renderer) = self.renderer() {
            settings.set_renderer(renderer);
        }
        if let Some(volume) = self.volume() {
            settings.set_volume(volume);
        }
    }

    /// Arguments the launcher passes to the player.
    pub fn worker_args(&self) -> Vec<String> {
        let mut args = vec![RUN_FROM_LAUNCHER_FLAG.to_string()];
        if self.window {
            args.push("--window".to_string());
        }
        args.push(format!("--bus={}", self.bus_name()));
        args
    }
}

fn filter_known(args: impl Iterator<Item = OsString>) -> Vec<OsString> {
    let mut args = args.peekable();
    let mut kept: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().to_string();
        let flag = text.split('=').next().unwrap_or_default();

        if FLAGS.contains(&flag) || flag == LAUNCH_FLAG {
            if text.contains('=') {
                debug!("Dropping value on flag '{text}'");
                kept.push(OsString::from(flag));
            } else {
                kept.push(arg);
            }
        } else if VALUE_OPTIONS.contains(&flag) {
            let has_inline_value = text.contains('=');
            kept.push(arg);
            if !has_inline_value {
                match args.next() {
                    Some(value) => kept.push(value),
                    None => {
                        debug!("Dropping '{flag}' without a value");
                        kept.pop();
                    }
                }
            }
        } else {
            debug!("Ignoring unknown argument '{text}'");
        }
    }

    kept
}
