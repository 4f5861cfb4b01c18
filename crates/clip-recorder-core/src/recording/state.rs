use std::fmt;

/// Lifecycle state of the active recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Nothing captured, ready to start.
    #[default]
    Idle,
    /// Waiting for the capture provider to grant a stream.
    Requesting,
    /// Capture stream is live and chunks are being buffered.
    Recording,
    /// Capture finished and a clip is available.
    Stopped,
}

impl RecordingState {
    /// Whether a new session may be started from this state.
    pub fn can_start(self) -> bool {
        matches!(self, RecordingState::Idle | RecordingState::Stopped)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordingState::Idle => "idle",
            RecordingState::Requesting => "requesting",
            RecordingState::Recording => "recording",
            RecordingState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Which user actions are currently enabled.
///
/// A disabled control is still callable on the controller; the call is
/// ignored. Front ends use this to grey out or hide actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Start a new recording.
    pub start: bool,
    /// Stop the live recording.
    pub stop: bool,
    /// Save the finished clip.
    pub save: bool,
    /// Preview the finished clip.
    pub play: bool,
}
