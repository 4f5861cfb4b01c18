use crate::recording::{BYTES_PER_SAMPLE, Chunk, StreamFormat};

use std::time::Duration;

/// Upper bound on the buffer reserved before the first sample arrives.
const MAX_PREALLOCATED_BYTES: usize = 1 << 20;

/// Groups captured f32 samples into i16 PCM chunks of a fixed duration.
#[derive(Debug)]
pub struct Chunker {
    pending: Vec<u8>,
    /// Bytes per emitted chunk; `None` holds everything until `flush`.
    chunk_bytes: Option<usize>,
}

impl Chunker {
    pub fn new(format: StreamFormat, interval: Duration) -> Self {
        // Float to int casts saturate, so huge intervals cannot wrap.
        let frames = (format.sample_rate as f64 * interval.as_secs_f64()).round() as usize;
        let chunk_bytes = Some(frames.saturating_mul(format.bytes_per_frame())).filter(|&b| b > 0);

        Self {
            pending: Vec::with_capacity(
                chunk_bytes
                    .unwrap_or_default()
                    .min(MAX_PREALLOCATED_BYTES),
            ),
            chunk_bytes,
        }
    }

    /// Append interleaved samples, returning every chunk that became full.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Chunk> {
        self.pending.reserve(samples.len() * BYTES_PER_SAMPLE);
        for &sample in samples {
            self.pending
                .extend_from_slice(&sample_to_i16(sample).to_le_bytes());
        }

        let Some(size) = self.chunk_bytes else {
            return Vec::new();
        };

        let mut ready = Vec::new();
        while self.pending.len() >= size {
            let rest = self.pending.split_off(size);
            ready.push(Chunk::new(std::mem::replace(&mut self.pending, rest)));
        }
        ready
    }

    /// Take whatever is buffered as a final, possibly short, chunk.
    pub fn flush(&mut self) -> Option<Chunk> {
        if self.pending.is_empty() {
            return None;
        }
        Some(Chunk::new(std::mem::take(&mut self.pending)))
    }

    /// Bytes waiting for the next chunk boundary.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn reserved(&self) -> usize {
        self.pending.capacity()
    }
}

/// Convert a float sample in `[-1.0, 1.0]` to signed 16-bit PCM, clamping.
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    (clamped * i16::MAX as f32).round() as i16
}
