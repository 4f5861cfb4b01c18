mod clip;
mod controller;
mod session;
mod state;

pub use {
    clip::{AUDIO_CONTENT_TYPE, BYTES_PER_SAMPLE, Chunk, Recording, StreamFormat},
    controller::{DiscardedRecording, RecordingController, StartOutcome},
    session::RecordingSession,
    state::{Controls, RecordingState},
};
