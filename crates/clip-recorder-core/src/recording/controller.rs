use crate::{
    CoreResult,
    capture::{
        CaptureProvider, CaptureRequest, ChunkRecorder, EventSink, RecorderEvent,
        RecorderEventKind,
    },
    output::{FileSaver, PlaybackSource, RECORDING_FILE_NAME},
    recording::{Chunk, Controls, Recording, RecordingSession, RecordingState, StreamFormat},
};

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Result of [`RecordingController::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Capture is live for a new session.
    Started {
        /// ID of the new session.
        session_id: Uuid,
        /// The clip that was replaced, if one existed.
        discarded: Option<DiscardedRecording>,
    },
    /// A session is already requesting or recording; nothing changed.
    Ignored,
}

/// Summary of a clip dropped because a new session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardedRecording {
    /// Session that produced the clip.
    pub session_id: Uuid,
    /// Size of the clip in bytes.
    pub bytes: usize,
    /// Whether the clip was saved at least once.
    pub saved: bool,
}

/// Owns the recording lifecycle and mediates between the capture provider,
/// the active recorder and the file saver.
///
/// # Thread Safety
///
/// Not thread-safe and not meant to be. Recorder callbacks only push
/// [`RecorderEvent`]s through the [`EventSink`]; whoever owns the
/// controller feeds them back in through [`on_event`](Self::on_event).
pub struct RecordingController {
    provider: Box<dyn CaptureProvider>,
    saver: Box<dyn FileSaver>,
    sink: EventSink,
    request: CaptureRequest,
    session: RecordingSession,
    recorder: Option<Box<dyn ChunkRecorder>>,
}

impl RecordingController {
    /// Create a controller in the Idle state.
    pub fn new(
        provider: Box<dyn CaptureProvider>,
        saver: Box<dyn FileSaver>,
        sink: EventSink,
        request: CaptureRequest,
    ) -> Self {
        Self {
            provider,
            saver,
            sink,
            request,
            session: RecordingSession::new(),
            recorder: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecordingState {
        self.session.state()
    }

    /// The active session.
    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// The finished clip, present only while Stopped.
    pub fn result(&self) -> Option<&Recording> {
        self.session.result()
    }

    /// Whether a finished clip exists that has never been saved.
    pub fn has_unsaved_result(&self) -> bool {
        self.session.result().is_some() && self.session.save_count() == 0
    }

    /// Which actions are currently enabled.
    pub fn controls(&self) -> Controls {
        let state = self.session.state();
        let has_result = self.session.result().is_some();
        Controls {
            start: state.can_start(),
            stop: state == RecordingState::Recording && !self.session.stop_requested(),
            save: has_result,
            play: has_result,
        }
    }

    /// Start a new session and request a capture stream.
    ///
    /// Ignored while a session is requesting or recording. Any previous
    /// clip is discarded and reported in the outcome.
    ///
    /// # Errors
    ///
    /// Returns `CaptureUnavailable` (or `DeviceError` if the granted stream
    /// fails to start). The controller is back in Idle with an empty buffer.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<StartOutcome> {
        let Some((session_id, discarded)) = self.begin_request() else {
            return Ok(StartOutcome::Ignored);
        };

        self.resolve_request(session_id)?;

        Ok(StartOutcome::Started {
            session_id,
            discarded,
        })
    }

    /// First half of [`start`](Self::start): replace the session and enter
    /// Requesting.
    ///
    /// Returns `None` when the current state does not allow starting.
    pub fn begin_request(&mut self) -> Option<(Uuid, Option<DiscardedRecording>)> {
        let state = self.session.state();
        if !state.can_start() {
            debug!(state = %state, "Start ignored");
            return None;
        }

        let previous = std::mem::take(&mut self.session);
        let discarded = previous.result().map(|r| DiscardedRecording {
            session_id: previous.id(),
            bytes: r.len(),
            saved: previous.save_count() > 0,
        });

        if let Some(d) = &discarded {
            if d.saved {
                info!(session_id = %d.session_id, bytes = d.bytes, "Previous recording discarded");
            } else {
                warn!(
                    session_id = %d.session_id,
                    bytes = d.bytes,
                    "Unsaved recording discarded"
                );
            }
        }
        if previous.has_cached_playback() {
            debug!(session_id = %previous.id(), "Playback source released");
        }
        drop(previous);

        self.session.begin_request();
        let session_id = self.session.id();
        debug!(session_id = %session_id, "Requesting capture stream");

        Some((session_id, discarded))
    }

    /// Ask the provider for a capture stream for `session_id` and hand the
    /// result to [`complete_request`](Self::complete_request).
    ///
    /// Front ends call this on a later turn of their event loop, after
    /// [`begin_request`](Self::begin_request). Dropped without touching the
    /// provider when `session_id` is no longer requesting.
    ///
    /// # Errors
    ///
    /// Same as [`complete_request`](Self::complete_request).
    pub fn resolve_request(&mut self, session_id: Uuid) -> CoreResult<()> {
        if self.session.id() != session_id || self.session.state() != RecordingState::Requesting
        {
            debug!(session_id = %session_id, "Stale capture request dropped");
            return Ok(());
        }

        let granted = self.provider.request(&self.request);
        self.complete_request(session_id, granted)
    }

    /// Deliver a capture resolution for `session_id`.
    ///
    /// A resolution for a session that is no longer requesting is dropped
    /// (the granted recorder is released unstarted).
    ///
    /// # Errors
    ///
    /// Propagates the provider's error, or the recorder's start error.
    /// The controller returns to Idle in both cases.
    pub fn complete_request(
        &mut self,
        session_id: Uuid,
        granted: CoreResult<Box<dyn ChunkRecorder>>,
    ) -> CoreResult<()> {
        if self.session.id() != session_id || self.session.state() != RecordingState::Requesting
        {
            debug!(session_id = %session_id, "Stale capture resolution dropped");
            return Ok(());
        }

        let mut recorder = match granted {
            Ok(recorder) => recorder,
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Capture request failed");
                self.session.fail_request();
                return Err(e);
            }
        };

        if let Err(e) = recorder.start(session_id, Arc::clone(&self.sink)) {
            error!(session_id = %session_id, error = ?e, "Recorder failed to start");
            self.session.fail_request();
            return Err(e);
        }

        self.session.begin_recording(recorder.format());
        self.recorder = Some(recorder);

        info!(session_id = %session_id, "Recording started");

        Ok(())
    }

    /// Append a chunk for `session_id`.
    ///
    /// Ignored unless that session is recording.
    pub fn on_chunk(&mut self, session_id: Uuid, chunk: Chunk) {
        if !self.is_recording(session_id) {
            debug!(session_id = %session_id, bytes = chunk.len(), "Chunk ignored");
            return;
        }
        self.session.push_chunk(chunk);
    }

    /// Signal the recorder to finalize.
    ///
    /// Returns `true` if a stop was requested. The clip becomes available
    /// once the recorder reports [`RecorderEventKind::Finalized`].
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> bool {
        if self.session.state() != RecordingState::Recording || self.session.stop_requested() {
            debug!(state = %self.session.state(), "Stop ignored");
            return false;
        }

        self.session.request_stop();
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.stop();
        }

        info!(
            session_id = %self.session.id(),
            chunk_count = self.session.chunks().len(),
            "Stop requested"
        );

        true
    }

    /// Dispatch a recorder event.
    ///
    /// Returns `true` if the event completed the session (Stopped).
    pub fn on_event(&mut self, event: RecorderEvent) -> bool {
        let RecorderEvent { session_id, kind } = event;
        match kind {
            RecorderEventKind::Chunk(chunk) => {
                self.on_chunk(session_id, chunk);
                false
            }
            RecorderEventKind::Finalized => self.on_finalized(session_id),
            RecorderEventKind::Failed(reason) => {
                if !self.is_recording(session_id) {
                    return false;
                }
                warn!(session_id = %session_id, reason = %reason, "Capture stream failed, finalizing");
                self.stop();
                false
            }
        }
    }

    fn on_finalized(&mut self, session_id: Uuid) -> bool {
        if !self.is_recording(session_id) {
            debug!(session_id = %session_id, "Finalization ignored");
            return false;
        }

        let fallback = self
            .recorder
            .take()
            .map(|r| r.format())
            .unwrap_or(StreamFormat {
                sample_rate: 0,
                channels: 0,
            });

        let chunk_count = self.session.chunks().len();
        let recording = self.session.finalize(fallback);

        info!(
            session_id = %session_id,
            chunk_count,
            bytes = recording.len(),
            duration_ms = recording.duration().as_millis(),
            "Recording stopped"
        );

        true
    }

    /// Save the finished clip as [`RECORDING_FILE_NAME`].
    ///
    /// Returns `Ok(None)` when there is no clip. Each call writes an
    /// independent file.
    ///
    /// # Errors
    ///
    /// Returns the saver's error; the clip is kept.
    #[instrument(skip(self))]
    pub fn save(&mut self) -> CoreResult<Option<PathBuf>> {
        let Some(recording) = self.session.result() else {
            debug!(state = %self.session.state(), "Save ignored");
            return Ok(None);
        };

        let path = self.saver.save(recording, RECORDING_FILE_NAME)?;
        self.session.mark_saved();

        Ok(Some(path))
    }

    /// Shared playback reference to the finished clip.
    ///
    /// Decoded on first call and cached until the clip is discarded.
    pub fn playback_source(&mut self) -> Option<Arc<PlaybackSource>> {
        self.session.playback()
    }

    /// Stop any live capture without producing a clip. Used at shutdown.
    pub fn abort(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.stop();
            info!(session_id = %self.session.id(), "Recording aborted");
        }
    }

    fn is_recording(&self, session_id: Uuid) -> bool {
        self.session.id() == session_id && self.session.state() == RecordingState::Recording
    }
}
