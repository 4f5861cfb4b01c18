use error_location::ErrorLocation;
use thiserror::Error;

/// Recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Capture was refused or no compatible capture device exists.
    #[error("Capture unavailable: {reason} {location}")]
    CaptureUnavailable {
        /// Why the capture stream could not be opened.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed after the device was found.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the clip to disk failed.
    #[error("Failed to save recording to {path:?}: {source} {location}")]
    SaveFailed {
        /// Path that was being written.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// WAV encoding failed.
    #[error("Encoding error: {reason} {location}")]
    EncodingFailed {
        /// Description of the encoding error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Preview playback could not be started.
    #[error("Playback error: {reason} {location}")]
    PlaybackError {
        /// Description of the playback error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
