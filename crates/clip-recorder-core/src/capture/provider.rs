use crate::{
    CoreResult,
    recording::{Chunk, StreamFormat},
};

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

/// Where audio is captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureSource {
    /// Whatever the system is playing (loopback / monitor device).
    #[default]
    SystemAudio,
    /// An input device such as a microphone.
    Microphone,
}

/// Parameters handed to a [`CaptureProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Kind of audio to capture.
    pub source: CaptureSource,
    /// Exact device name, or `None` to pick one automatically.
    pub device: Option<String>,
    /// Audio duration per emitted chunk. Zero emits one chunk at stop.
    pub chunk_interval: Duration,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            source: CaptureSource::SystemAudio,
            device: None,
            chunk_interval: Duration::from_secs(1),
        }
    }
}

/// Notification from a running recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderEvent {
    /// Session the recorder was started for.
    pub session_id: Uuid,
    /// What happened.
    pub kind: RecorderEventKind,
}

/// Payload of a [`RecorderEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEventKind {
    /// A new chunk of encoded audio is available.
    Chunk(Chunk),
    /// The recorder flushed its last chunk and released the stream.
    Finalized,
    /// The stream reported an error (device lost, driver fault).
    Failed(String),
}

impl RecorderEvent {
    /// Chunk event for `session_id`.
    pub fn chunk(session_id: Uuid, chunk: impl Into<Chunk>) -> Self {
        Self {
            session_id,
            kind: RecorderEventKind::Chunk(chunk.into()),
        }
    }

    /// Finalization event for `session_id`.
    pub fn finalized(session_id: Uuid) -> Self {
        Self {
            session_id,
            kind: RecorderEventKind::Finalized,
        }
    }

    /// Failure event for `session_id`.
    pub fn failed(session_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            session_id,
            kind: RecorderEventKind::Failed(reason.into()),
        }
    }
}

/// Callback through which recorders deliver events.
///
/// Invoked from the audio thread; implementations must not block.
pub type EventSink = Arc<dyn Fn(RecorderEvent) + Send + Sync>;

/// Grants capture streams.
pub trait CaptureProvider {
    /// Open a capture stream matching `request`, wrapped in an idle recorder.
    ///
    /// # Errors
    ///
    /// Returns `CaptureUnavailable` when access is refused or no compatible
    /// device exists.
    fn request(&mut self, request: &CaptureRequest) -> CoreResult<Box<dyn ChunkRecorder>>;
}

/// Turns a live capture stream into a sequence of chunks.
pub trait ChunkRecorder {
    /// Format of the chunks this recorder emits.
    fn format(&self) -> StreamFormat;

    /// Begin emitting events for `session_id` into `sink`.
    fn start(&mut self, session_id: Uuid, sink: EventSink) -> CoreResult<()>;

    /// Finalize: flush any pending chunk, release the stream, then emit
    /// [`RecorderEventKind::Finalized`]. Calling twice is harmless.
    fn stop(&mut self);
}

