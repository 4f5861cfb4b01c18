use crate::{
    output::PlaybackSource,
    recording::{Chunk, Recording, RecordingState, StreamFormat},
};

use std::sync::Arc;

use uuid::Uuid;

/// One start-to-stop cycle.
///
/// Owned exclusively by the controller. Replacing the session discards its
/// chunks, its result and any cached playback source.
#[derive(Debug)]
pub struct RecordingSession {
    id: Uuid,
    state: RecordingState,
    format: Option<StreamFormat>,
    chunks: Vec<Chunk>,
    result: Option<Recording>,
    playback: Option<Arc<PlaybackSource>>,
    stop_requested: bool,
    save_count: u32,
}

impl RecordingSession {
    /// Fresh session in the Idle state with an empty buffer.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RecordingState::Idle,
            format: None,
            chunks: Vec::new(),
            result: None,
            playback: None,
            stop_requested: false,
            save_count: 0,
        }
    }

    /// Session ID for log correlation and event routing.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Chunks buffered so far, in arrival order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Total buffered bytes.
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// The finished clip; present only while Stopped.
    pub fn result(&self) -> Option<&Recording> {
        self.result.as_ref()
    }

    /// Whether `stop()` has been signalled and finalization is pending.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// How many times the result has been saved.
    pub fn save_count(&self) -> u32 {
        self.save_count
    }

    pub(crate) fn begin_request(&mut self) {
        self.state = RecordingState::Requesting;
    }

    pub(crate) fn fail_request(&mut self) {
        self.state = RecordingState::Idle;
        self.format = None;
        self.chunks.clear();
    }

    pub(crate) fn begin_recording(&mut self, format: StreamFormat) {
        self.chunks.clear();
        self.format = Some(format);
        self.state = RecordingState::Recording;
    }

    pub(crate) fn push_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    pub(crate) fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Assemble the buffered chunks into the result and enter Stopped.
    pub(crate) fn finalize(&mut self, fallback: StreamFormat) -> &Recording {
        let format = self.format.unwrap_or(fallback);
        let chunks = std::mem::take(&mut self.chunks);
        self.state = RecordingState::Stopped;
        self.stop_requested = false;
        self.result
            .insert(Recording::assemble(self.id, format, &chunks))
    }

    pub(crate) fn mark_saved(&mut self) {
        self.save_count += 1;
    }

    /// Cached playback source, decoded on first use.
    pub(crate) fn playback(&mut self) -> Option<Arc<PlaybackSource>> {
        if let Some(source) = &self.playback {
            return Some(Arc::clone(source));
        }
        let recording = self.result.as_ref()?;
        let source = Arc::new(PlaybackSource::from_recording(recording));
        self.playback = Some(Arc::clone(&source));
        Some(source)
    }

    pub(crate) fn has_cached_playback(&self) -> bool {
        self.playback.is_some()
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
