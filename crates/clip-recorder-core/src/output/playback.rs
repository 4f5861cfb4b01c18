use crate::{
    CoreResult, RecorderError,
    recording::{Recording, StreamFormat},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use cpal::{
    Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// A finished clip decoded to f32 for preview playback.
///
/// Decoded once per clip and shared; the controller drops its copy when
/// the clip is discarded.
#[derive(Debug)]
pub struct PlaybackSource {
    format: StreamFormat,
    samples: Vec<f32>,
}

impl PlaybackSource {
    /// Decode the 16-bit PCM of `recording`.
    pub fn from_recording(recording: &Recording) -> Self {
        let samples = recording
            .samples()
            .map(|s| s as f32 / i16::MAX as f32)
            .collect();

        Self {
            format: recording.format(),
            samples,
        }
    }

    /// Format of the decoded samples.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        match self.format.channels {
            0 => 0,
            channels => self.samples.len() / channels as usize,
        }
    }

    /// Playing time.
    pub fn duration(&self) -> Duration {
        if self.format.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.format.sample_rate as f64)
    }
}

/// Read position into a [`PlaybackSource`] for an output of a given format.
#[derive(Debug, Clone)]
pub(crate) struct PlaybackCursor {
    position: f64,
    step: f64,
    out_channels: usize,
}

impl PlaybackCursor {
    pub(crate) fn new(source: &PlaybackSource, output: StreamFormat) -> Self {
        let step = if output.sample_rate == 0 {
            1.0
        } else {
            source.format.sample_rate as f64 / output.sample_rate as f64
        };

        Self {
            position: 0.0,
            step,
            out_channels: output.channels.max(1) as usize,
        }
    }

    /// Fill `out` with interleaved frames, returning `false` once the source
    /// is exhausted. Remaining output is silence.
    pub(crate) fn fill(&mut self, source: &PlaybackSource, out: &mut [f32]) -> bool {
        let frames = source.frames();
        let src_channels = source.format.channels.max(1) as usize;

        for frame in out.chunks_mut(self.out_channels) {
            let index = self.position as usize;
            if index >= frames {
                frame.fill(0.0);
                continue;
            }
            let base = index * src_channels;
            for (channel, slot) in frame.iter_mut().enumerate() {
                *slot = source.samples[base + channel % src_channels];
            }
            self.position += self.step;
        }

        (self.position as usize) < frames
    }
}

/// Plays a [`PlaybackSource`] on the default output device.
///
/// Playback stops when the player is dropped.
pub struct AudioPlayer {
    _stream: Stream,
    finished: Arc<AtomicBool>,
    duration: Duration,
}

impl AudioPlayer {
    /// Start playing `source` immediately.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if no output device is available or the
    /// stream cannot be started.
    #[track_caller]
    #[instrument(skip(source))]
    pub fn play(source: Arc<PlaybackSource>) -> CoreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(RecorderError::PlaybackError {
                reason: "No output device found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_output_config()
            .map_err(|e| RecorderError::PlaybackError {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let output = StreamFormat {
            sample_rate: config.sample_rate(),
            channels: config.channels(),
        };
        let mut cursor = PlaybackCursor::new(&source, output);
        let finished = Arc::new(AtomicBool::new(false));
        let callback_finished = Arc::clone(&finished);
        let duration = source.duration();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !cursor.fill(&source, data) {
                        callback_finished.store(true, Ordering::Release);
                    }
                },
                |err| {
                    error!("Playback stream error: {}", err);
                },
                None,
            )
            .map_err(|e| RecorderError::PlaybackError {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| RecorderError::PlaybackError {
            reason: format!("Failed to start output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(duration_ms = duration.as_millis(), "Playback started");

        Ok(Self {
            _stream: stream,
            finished,
            duration,
        })
    }

    /// Whether the whole clip has been played.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Length of the clip being played.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}
