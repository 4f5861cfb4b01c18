use std::time::Duration;

use uuid::Uuid;

/// Content type attached to every assembled clip.
pub const AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// Bytes per sample in recorder chunks (signed 16-bit PCM).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Sample rate and channel layout of a capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl StreamFormat {
    /// Bytes occupied by one frame of interleaved PCM.
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }
}

/// Opaque binary segment emitted by a recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk(Vec<u8>);

impl Chunk {
    /// Wrap raw recorder bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bytes of this chunk.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chunk carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// A finished clip: every chunk of one session, concatenated in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    session_id: Uuid,
    format: StreamFormat,
    data: Vec<u8>,
}

impl Recording {
    /// Concatenate `chunks` into a single clip.
    pub fn assemble(session_id: Uuid, format: StreamFormat, chunks: &[Chunk]) -> Self {
        let total: usize = chunks.iter().map(Chunk::len).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in chunks {
            data.extend_from_slice(chunk.as_bytes());
        }

        Self {
            session_id,
            format,
            data,
        }
    }

    /// Session that produced this clip.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Format of the captured stream.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Content type tag of the clip.
    pub fn content_type(&self) -> &'static str {
        AUDIO_CONTENT_TYPE
    }

    /// Assembled bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the clip in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate the clip as interleaved i16 samples.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Playing time of the clip.
    pub fn duration(&self) -> Duration {
        let frame_bytes = self.format.bytes_per_frame();
        if frame_bytes == 0 || self.format.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = (self.data.len() / frame_bytes) as f64;
        Duration::from_secs_f64(frames / self.format.sample_rate as f64)
    }
}
