use crate::{
    StreamFormat,
    capture::{Chunker, chunker::sample_to_i16},
};

use std::time::Duration;

// Test constants
const MONO_1K: StreamFormat = StreamFormat {
    sample_rate: 1_000,
    channels: 1,
};
const STEREO_1K: StreamFormat = StreamFormat {
    sample_rate: 1_000,
    channels: 2,
};
const TEN_MS: Duration = Duration::from_millis(10);

/// WHAT: Chunks are cut at the configured interval
/// WHY: Recorder emits one chunk per interval of audio
#[test]
fn given_ten_ms_interval_when_pushing_25_ms_then_two_chunks_and_remainder() {
    // Given: 10 ms chunks at 1 kHz mono (10 frames, 20 bytes)
    let mut chunker = Chunker::new(MONO_1K, TEN_MS);

    // When: Pushing 25 frames
    let ready = chunker.push(&[0.0; 25]);

    // Then: Two full chunks, five frames pending
    assert_eq!(ready.len(), 2);
    assert!(ready.iter().all(|c| c.len() == 20));
    assert_eq!(chunker.pending_len(), 10);
}

/// WHAT: Flush returns the short remainder once
/// WHY: The last partial chunk must reach the clip on stop
#[test]
#[allow(clippy::unwrap_used)]
fn given_pending_samples_when_flushing_then_remainder_returned_once() {
    // Given: A partially filled chunk
    let mut chunker = Chunker::new(STEREO_1K, TEN_MS);
    chunker.push(&[0.5; 6]);

    // When: Flushing twice
    let first = chunker.flush();
    let second = chunker.flush();

    // Then: Six samples of 2 bytes, then nothing
    assert_eq!(first.unwrap().len(), 12);
    assert!(second.is_none());
}

/// WHAT: Zero interval buffers everything until flush
/// WHY: Mirrors a recorder started without a timeslice
#[test]
#[allow(clippy::unwrap_used)]
fn given_zero_interval_when_pushing_then_single_chunk_on_flush() {
    // Given: No interval
    let mut chunker = Chunker::new(MONO_1K, Duration::ZERO);

    // When: Pushing a lot of audio
    let ready = chunker.push(&[0.1; 5_000]);

    // Then: Nothing emitted until flush returns it all
    assert!(ready.is_empty());
    assert_eq!(chunker.flush().unwrap().len(), 10_000);
}

/// WHAT: Concatenated chunks equal the PCM of all pushed samples
/// WHY: Chunk boundaries must not drop or duplicate bytes
#[test]
#[allow(clippy::unwrap_used)]
fn given_uneven_pushes_when_chunking_then_bytes_preserved_in_order() {
    // Given: A ramp pushed in uneven slices
    let mut chunker = Chunker::new(MONO_1K, TEN_MS);
    let ramp: Vec<f32> = (0..37).map(|i| i as f32 / 100.0).collect();
    let mut out = Vec::new();

    // When: Pushing 3, 11 and 23 samples then flushing
    for slice in [&ramp[..3], &ramp[3..14], &ramp[14..]] {
        for chunk in chunker.push(slice) {
            out.extend_from_slice(chunk.as_bytes());
        }
    }
    out.extend_from_slice(chunker.flush().unwrap().as_bytes());

    // Then: Every sample is present in order
    let expected: Vec<u8> = ramp
        .iter()
        .flat_map(|&s| sample_to_i16(s).to_le_bytes())
        .collect();
    assert_eq!(out, expected);
}

/// WHAT: Float to PCM conversion clamps and maps the full range
/// WHY: Out-of-range or NaN samples must not wrap around
#[test]
fn given_edge_samples_when_converting_then_clamped_to_i16_range() {
    assert_eq!(sample_to_i16(0.0), 0);
    assert_eq!(sample_to_i16(1.0), i16::MAX);
    assert_eq!(sample_to_i16(-1.0), -i16::MAX);
    assert_eq!(sample_to_i16(3.5), i16::MAX);
    assert_eq!(sample_to_i16(-7.0), -i16::MAX);
    assert_eq!(sample_to_i16(f32::NAN), 0);
}

/// WHAT: Long intervals reserve a bounded buffer up front
/// WHY: An hour-long interval must not allocate hundreds of megabytes at start
#[test]
fn given_one_hour_interval_when_creating_chunker_then_reservation_capped() {
    // Given: 48 kHz stereo, one chunk per hour
    let format = StreamFormat {
        sample_rate: 48_000,
        channels: 2,
    };

    // When: Creating the chunker
    let chunker = Chunker::new(format, Duration::from_secs(3_600));

    // Then: At most 1 MiB reserved
    assert!(chunker.reserved() <= 1 << 20);
    assert_eq!(chunker.pending_len(), 0);
}

/// WHAT: An interval too large to represent in bytes does not overflow
/// WHY: Interval comes from user config; size math must saturate
#[test]
#[allow(clippy::unwrap_used)]
fn given_maximum_interval_when_pushing_then_buffered_until_flush() {
    // Given: The largest representable interval
    let mut chunker = Chunker::new(STEREO_1K, Duration::from_millis(u64::MAX));

    // When: Pushing some audio
    let ready = chunker.push(&[0.25; 64]);

    // Then: No chunk boundary reached; everything returned on flush
    assert!(ready.is_empty());
    assert_eq!(chunker.flush().unwrap().len(), 128);
}

/// WHAT: A zero-channel format never emits empty chunks
/// WHY: A zero chunk size would cut forever
#[test]
fn given_zero_channel_format_when_pushing_then_no_chunks() {
    let mut chunker = Chunker::new(
        StreamFormat {
            sample_rate: 1_000,
            channels: 0,
        },
        TEN_MS,
    );

    assert!(chunker.push(&[0.0; 4]).is_empty());
}
