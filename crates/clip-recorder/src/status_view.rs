use crate::AppCommand;

use clip_recorder_core::{Controls, RecordingController, RecordingState};

use std::{io::Write, time::Duration};

/// Alert shown when a capture stream cannot be obtained.
pub const CAPTURE_ALERT: &str = "Failed to start recording. Please allow access to system audio.";

/// The finished clip as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSummary {
    /// Length of the clip.
    pub duration: Duration,
    /// Size in bytes.
    pub bytes: usize,
    /// How many times it has been saved.
    pub save_count: u32,
}

/// Everything the status view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Lifecycle state.
    pub state: RecordingState,
    /// Enabled actions.
    pub controls: Controls,
    /// Bytes captured so far in the live session.
    pub buffered_bytes: usize,
    /// Finished clip, if any.
    pub clip: Option<ClipSummary>,
}

impl StatusSnapshot {
    /// Capture the controller's current status.
    pub fn of(controller: &RecordingController) -> Self {
        let session = controller.session();
        Self {
            state: controller.state(),
            controls: controller.controls(),
            buffered_bytes: session.buffered_bytes(),
            clip: controller.result().map(|r| ClipSummary {
                duration: r.duration(),
                bytes: r.len(),
                save_count: session.save_count(),
            }),
        }
    }

    /// `ON` only while capture is live.
    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }
}

/// Plain-text status output.
pub struct StatusView<W: Write> {
    out: W,
}

impl<W: Write> StatusView<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print the status line, the controls and the clip summary.
    pub fn render(&mut self, status: &StatusSnapshot) -> std::io::Result<()> {
        let on_off = if status.is_recording() { "ON" } else { "OFF" };
        writeln!(self.out, "Recording Status: {}", on_off)?;

        let controls = [
            ("start", status.controls.start),
            ("stop", status.controls.stop),
            ("save", status.controls.save),
            ("play", status.controls.play),
        ]
        .iter()
        .map(|(name, enabled)| {
            if *enabled {
                (*name).to_string()
            } else {
                format!("{} (disabled)", name)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
        writeln!(self.out, "Controls: {}", controls)?;

        if status.is_recording() {
            writeln!(self.out, "Captured: {} bytes", status.buffered_bytes)?;
        }

        if let Some(clip) = status.clip {
            let saved = match clip.save_count {
                0 => "unsaved".to_string(),
                1 => "saved".to_string(),
                n => format!("saved {} times", n),
            };
            writeln!(
                self.out,
                "Recording: {:.1} s, {} bytes ({})",
                clip.duration.as_secs_f64(),
                clip.bytes,
                saved
            )?;
        }

        self.out.flush()
    }

    /// Print a one-line message.
    pub fn notice(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    /// Print a user-facing alert.
    pub fn alert(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "ALERT: {}", message)?;
        self.out.flush()
    }

    /// Print the command list.
    pub fn help(&mut self) -> std::io::Result<()> {
        self.notice(AppCommand::HELP)
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.out
    }
}
