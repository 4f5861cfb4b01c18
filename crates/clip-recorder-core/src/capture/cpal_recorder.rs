use crate::{
    CoreResult, RecorderError,
    capture::{ChunkRecorder, Chunker, EventSink, RecorderEvent},
    recording::StreamFormat,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// State shared between the recorder and its audio callback.
struct ActiveCapture {
    session_id: Uuid,
    sink: EventSink,
    chunker: Arc<Mutex<Chunker>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback emits after the final
    /// flush.
    shutdown: Arc<AtomicBool>,
}

/// Chunked recorder over a cpal input stream.
pub struct CpalRecorder {
    device: Device,
    config: StreamConfig,
    chunk_interval: Duration,
    stream: Option<Stream>,
    active: Option<ActiveCapture>,
}

impl CpalRecorder {
    /// Wrap an opened device; capture begins on [`ChunkRecorder::start`].
    pub fn new(device: Device, config: StreamConfig, chunk_interval: Duration) -> Self {
        Self {
            device,
            config,
            chunk_interval,
            stream: None,
            active: None,
        }
    }
}

impl ChunkRecorder for CpalRecorder {
    fn format(&self) -> StreamFormat {
        StreamFormat {
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
        }
    }

    #[track_caller]
    #[instrument(skip(self, sink))]
    fn start(&mut self, session_id: Uuid, sink: EventSink) -> CoreResult<()> {
        if self.active.is_some() {
            warn!(session_id = %session_id, "Recorder already started");
            return Ok(());
        }

        let chunker = Arc::new(Mutex::new(Chunker::new(
            self.format(),
            self.chunk_interval,
        )));
        let shutdown = Arc::new(AtomicBool::new(false));

        let data_chunker = Arc::clone(&chunker);
        let data_shutdown = Arc::clone(&shutdown);
        let data_sink = Arc::clone(&sink);
        let error_sink = Arc::clone(&sink);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if data_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let ready = {
                        // A poisoned lock still holds valid PCM; keep recording.
                        let mut chunker = data_chunker.lock().unwrap_or_else(|e| {
                            error!("Chunker lock poisoned, recovering: {}", e);
                            e.into_inner()
                        });
                        chunker.push(data)
                    };
                    for chunk in ready {
                        data_sink(RecorderEvent::chunk(session_id, chunk));
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_sink(RecorderEvent::failed(session_id, err.to_string()));
                },
                None,
            )
            .map_err(|e| RecorderError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| RecorderError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        self.active = Some(ActiveCapture {
            session_id,
            sink,
            chunker,
            shutdown,
        });

        info!(
            session_id = %session_id,
            sample_rate = self.config.sample_rate,
            channels = self.config.channels,
            chunk_interval_ms = self.chunk_interval.as_millis(),
            "Audio capture started"
        );

        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        active.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Some backends return from drop before the last callback has
            // observed the shutdown flag.
            std::thread::sleep(Duration::from_millis(5));
            info!(session_id = %active.session_id, "Audio capture stopped");
        }

        let tail = active
            .chunker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .flush();

        if let Some(chunk) = tail {
            debug!(bytes = chunk.len(), "Flushed final chunk");
            (active.sink)(RecorderEvent::chunk(active.session_id, chunk));
        }

        (active.sink)(RecorderEvent::finalized(active.session_id));
    }
}
