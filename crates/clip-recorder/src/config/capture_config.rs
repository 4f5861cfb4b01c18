use crate::config::{DEFAULT_CHUNK_INTERVAL_MS, MAX_CHUNK_INTERVAL_MS, default_chunk_interval_ms};

use clip_recorder_core::{CaptureRequest, CaptureSource};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capture source as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSourceSetting {
    /// System audio via loopback or a monitor device.
    #[default]
    System,
    /// Default input device.
    Microphone,
}

impl From<CaptureSourceSetting> for CaptureSource {
    fn from(setting: CaptureSourceSetting) -> Self {
        match setting {
            CaptureSourceSetting::System => CaptureSource::SystemAudio,
            CaptureSourceSetting::Microphone => CaptureSource::Microphone,
        }
    }
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// What to capture.
    #[serde(default)]
    pub source: CaptureSourceSetting,

    /// Exact device name (None = pick from `source`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Milliseconds of audio per chunk, at most [`MAX_CHUNK_INTERVAL_MS`].
    /// 0 buffers everything until stop.
    #[serde(default = "default_chunk_interval_ms")]
    pub chunk_interval_ms: u64,
}

impl CaptureConfig {
    /// The request handed to the capture provider.
    pub fn to_request(&self) -> CaptureRequest {
        CaptureRequest {
            source: self.source.into(),
            device: self.device.clone(),
            chunk_interval: Duration::from_millis(
                self.chunk_interval_ms.min(MAX_CHUNK_INTERVAL_MS),
            ),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSourceSetting::default(),
            device: None,
            chunk_interval_ms: DEFAULT_CHUNK_INTERVAL_MS,
        }
    }
}
