//! Clip-recorder Core Library
//!
//! Capture system audio through CPAL, buffer it as chunks and save the
//! finished clip as a WAV file.
//!
//! # Example
//!
//! ```no_run
//! use clip_recorder_core::{
//!     CaptureRequest, CoreResult, CpalProvider, DownloadSaver, ConflictPolicy,
//!     RecorderEvent, RecordingController,
//! };
//!
//! use std::sync::{Arc, mpsc};
//!
//! fn main() -> CoreResult<()> {
//!     let (tx, rx) = mpsc::channel::<RecorderEvent>();
//!     let sink = Arc::new(move |event: RecorderEvent| {
//!         let _ = tx.send(event);
//!     });
//!
//!     let mut controller = RecordingController::new(
//!         Box::new(CpalProvider::new()),
//!         Box::new(DownloadSaver::new("/tmp", ConflictPolicy::Rename)),
//!         sink,
//!         CaptureRequest::default(),
//!     );
//!
//!     controller.start()?;
//!     std::thread::sleep(std::time::Duration::from_secs(3));
//!     controller.stop();
//!
//!     while let Ok(event) = rx.recv() {
//!         if controller.on_event(event) {
//!             break;
//!         }
//!     }
//!
//!     if let Some(path) = controller.save()? {
//!         println!("Saved to {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod output;
mod recording;

pub use {
    capture::{
        CaptureProvider, CaptureRequest, CaptureSource, ChunkRecorder, CpalProvider, CpalRecorder,
        EventSink, RecorderEvent, RecorderEventKind,
    },
    error::{RecorderError, Result as CoreResult},
    output::{
        AudioPlayer, ConflictPolicy, DownloadSaver, FileSaver, PlaybackSource,
        RECORDING_FILE_NAME,
    },
    recording::{
        AUDIO_CONTENT_TYPE, BYTES_PER_SAMPLE, Chunk, Controls, DiscardedRecording, Recording,
        RecordingController, RecordingSession, RecordingState, StartOutcome, StreamFormat,
    },
};
