pub(crate) mod chunker;
mod cpal_provider;
mod cpal_recorder;
mod provider;

pub(crate) use chunker::Chunker;

pub use {
    cpal_provider::CpalProvider,
    cpal_recorder::CpalRecorder,
    provider::{
        CaptureProvider, CaptureRequest, CaptureSource, ChunkRecorder, EventSink, RecorderEvent,
        RecorderEventKind,
    },
};
