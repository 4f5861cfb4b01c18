use crate::AppError;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Commands read from stdin and handled by the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new recording session.
    Start,
    /// Stop the current recording session.
    Stop,
    /// Save the finished recording.
    Save,
    /// Preview the finished recording.
    Play,
    /// Print the status view.
    Status,
    /// List capture devices.
    Devices,
    /// Print the command list.
    Help,
    /// Request application shutdown.
    Shutdown,
}

impl AppCommand {
    /// Command list shown by `help`.
    pub const HELP: &'static str = "\
Commands:
  start   (r)  start recording
  stop    (x)  stop recording
  save    (w)  save as recording.wav
  play    (p)  preview the recording
  status  (i)  show recording status
  devices (d)  list capture devices
  help    (h)  show this list
  quit    (q)  exit";
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        match input.to_ascii_lowercase().as_str() {
            "start" | "r" => Ok(Self::Start),
            "stop" | "x" => Ok(Self::Stop),
            "save" | "w" => Ok(Self::Save),
            "play" | "p" => Ok(Self::Play),
            "status" | "i" => Ok(Self::Status),
            "devices" | "d" => Ok(Self::Devices),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Shutdown),
            _ => Err(AppError::UnknownCommand {
                input: input.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
