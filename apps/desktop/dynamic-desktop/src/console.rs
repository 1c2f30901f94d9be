//! Line-oriented stand-in for the tray menu.
//!
//! Each stdin line is one user action, e.g. `volume 40`, `url /videos/rain.mp4`,
//! `track audio 2`, `autostart on`, `quit`.

use models::{ImageQuality, Renderer, TrackKind};

use std::str::FromStr;

use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::sync::mpsc;

const CONSOLE_BUFFER: usize = 16;

pub const HELP: &str = "\
commands:
  play | pause | stop | status | help | quit
  volume <0-99> | mute | unmute | seek <ms>
  url <path-or-url>
  track <video|audio|subtitle> <id>
  subtitle <file> | audio <file> | charset <name>
  subautoload <on|off> | subtitles <on|off>
  renderer <opengl|gl|qt|gdi|d2d> | quality <best|fastest|default> | fit <on|off>
  autostart <on|off> | echo <text>";

/// One user action typed on the console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Play,
    Pause,
    Stop,
    Seek(i64),
    Volume(u32),
    Mute(bool),
    Url(String),
    Track(TrackKind, u32),
    SubtitleFile(String),
    AudioFile(String),
    Charset(String),
    SubtitleAutoLoad(bool),
    SubtitlesEnabled(bool),
    Renderer(Renderer),
    Quality(ImageQuality),
    Fit(bool),
    Autostart(bool),
    Echo(String),
    Status,
    Help,
    Quit,
}

impl FromStr for ConsoleAction {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let action = match verb.to_ascii_lowercase().as_str() {
            "play" => ConsoleAction::Play,
            "pause" => ConsoleAction::Pause,
            "stop" => ConsoleAction::Stop,
            "status" => ConsoleAction::Status,
            "help" | "?" => ConsoleAction::Help,
            "quit" | "exit" => ConsoleAction::Quit,
            "mute" => ConsoleAction::Mute(true),
            "unmute" => ConsoleAction::Mute(false),
            "seek" => ConsoleAction::Seek(number(verb, rest)?),
            "volume" => {
                let volume: i64 = number(verb, rest)?;
                ConsoleAction::Volume(volume.clamp(0, i64::from(u32::MAX)) as u32)
            }
            "url" => ConsoleAction::Url(rest.to_string()),
            "track" => {
                let (kind, id) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "usage: track <video|audio|subtitle> <id>".to_string())?;
                ConsoleAction::Track(track_kind(kind)?, number(verb, id.trim())?)
            }
            "subtitle" => ConsoleAction::SubtitleFile(required(verb, rest)?),
            "audio" => ConsoleAction::AudioFile(required(verb, rest)?),
            "charset" => ConsoleAction::Charset(required(verb, rest)?),
            "subautoload" => ConsoleAction::SubtitleAutoLoad(switch(verb, rest)?),
            "subtitles" => ConsoleAction::SubtitlesEnabled(switch(verb, rest)?),
            "renderer" => ConsoleAction::Renderer(rest.parse()?),
            "quality" => ConsoleAction::Quality(rest.parse()?),
            "fit" => ConsoleAction::Fit(switch(verb, rest)?),
            "autostart" => ConsoleAction::Autostart(switch(verb, rest)?),
            "echo" => ConsoleAction::Echo(rest.to_string()),
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };

        Ok(action)
    }
}

fn number<T: FromStr>(verb: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("'{verb}' expects a number, got '{value}'"))
}

fn required(verb: &str, value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("'{verb}' expects an argument"))
    } else {
        Ok(value.to_string())
    }
}

fn switch(verb: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(format!("'{verb}' expects on or off, got '{value}'")),
    }
}

fn track_kind(value: &str) -> Result<TrackKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "video" => Ok(TrackKind::Video),
        "audio" => Ok(TrackKind::Audio),
        "subtitle" | "sub" => Ok(TrackKind::Subtitle),
        other => Err(format!("unknown track kind '{other}'")),
    }
}

/// Forward stdin lines until EOF. The receiver yields `None` once stdin closes.
pub fn spawn_reader() -> mpsc::Receiver<String> {
    let (lines_tx, lines_rx) = mpsc::channel(CONSOLE_BUFFER);

    tokio::spawn(async move {
        let mut lines = BufReader::new(stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if lines_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Console input closed");
                    break;
                }
                Err(e) => {
                    debug!("Console read failed: {e}");
                    break;
                }
            }
        }
    });

    lines_rx
}
