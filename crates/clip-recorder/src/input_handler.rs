//! Line-oriented command input.
//!
//! Reads commands from stdin on a blocking task and forwards them to the
//! main application over an async channel.

use crate::{AppCommand, AppError, AppResult};

use std::{
    io::{self, BufRead},
    panic::Location,
};

use error_location::ErrorLocation;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, instrument, warn};

/// Parsed input as delivered to the application.
pub type CommandInput = AppResult<AppCommand>;

/// Forwards stdin commands to the application.
pub struct InputHandler {
    command_tx: mpsc::Sender<CommandInput>,
}

impl InputHandler {
    /// Create a handler that sends into `command_tx`.
    pub fn new(command_tx: mpsc::Sender<CommandInput>) -> Self {
        Self { command_tx }
    }

    /// Start the stdin forwarder.
    ///
    /// Single persistent blocking task. It ends on EOF, or on the first
    /// send after the receiver is dropped. A task parked in `read_line`
    /// with no further input is left to the runtime's shutdown timeout.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            if let Err(e) = self.forward_lines(stdin.lock()) {
                debug!(error = ?e, "Input forwarder stopped");
            }
        })
    }

    /// Forward each non-blank line of `reader` as a parsed command.
    ///
    /// EOF is forwarded as [`AppCommand::Shutdown`]. Must be called from a
    /// blocking context.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn forward_lines<R: BufRead>(&self, reader: R) -> AppResult<()> {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = ?e, "Failed to read input, treating as EOF");
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            self.send(line.parse())?;
        }

        debug!("Input closed");
        self.send(Ok(AppCommand::Shutdown))
    }

    #[track_caller]
    fn send(&self, input: CommandInput) -> AppResult<()> {
        self.command_tx
            .blocking_send(input)
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to forward command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
