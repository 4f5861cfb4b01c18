use crate::{
    CoreResult, RecorderError,
    capture::{CaptureProvider, CaptureRequest, CaptureSource, ChunkRecorder, CpalRecorder},
};

use std::panic::Location;

use cpal::{
    Device, Host, SupportedStreamConfig,
    traits::{DeviceTrait, HostTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Substring identifying PulseAudio/PipeWire monitor sources.
const MONITOR_MARKER: &str = "monitor";

/// Capture provider backed by the platform's default cpal host.
pub struct CpalProvider {
    host: Host,
}

impl CpalProvider {
    /// Provider on the default host.
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Names of every input device, for diagnostics and configuration.
    #[track_caller]
    pub fn input_device_names(&self) -> CoreResult<Vec<String>> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| RecorderError::DeviceError {
                reason: format!("Failed to enumerate input devices: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(devices.filter_map(|d| device_name(&d)).collect())
    }

    #[track_caller]
    fn open(&self, request: &CaptureRequest) -> CoreResult<(Device, SupportedStreamConfig)> {
        if let Some(name) = &request.device {
            return self.open_named(name);
        }

        match request.source {
            CaptureSource::Microphone => {
                let device =
                    self.host
                        .default_input_device()
                        .ok_or(RecorderError::CaptureUnavailable {
                            reason: "No input device found".to_string(),
                            location: ErrorLocation::from(Location::caller()),
                        })?;
                let config = input_config(&device)?;
                Ok((device, config))
            }
            CaptureSource::SystemAudio => self.open_system_audio(),
        }
    }

    #[track_caller]
    fn open_named(&self, name: &str) -> CoreResult<(Device, SupportedStreamConfig)> {
        let inputs = self
            .host
            .input_devices()
            .map_err(|e| RecorderError::CaptureUnavailable {
                reason: format!("Failed to enumerate input devices: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        for device in inputs {
            if device_name(&device).as_deref() == Some(name) {
                let config = input_config(&device)?;
                return Ok((device, config));
            }
        }

        // WASAPI captures an output device in loopback mode.
        #[cfg(target_os = "windows")]
        if let Ok(outputs) = self.host.output_devices() {
            for device in outputs {
                if device_name(&device).as_deref() == Some(name) {
                    let config = output_config(&device)?;
                    return Ok((device, config));
                }
            }
        }

        Err(RecorderError::CaptureUnavailable {
            reason: format!("Capture device not found: {}", name),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[cfg(target_os = "windows")]
    #[track_caller]
    fn open_system_audio(&self) -> CoreResult<(Device, SupportedStreamConfig)> {
        let device =
            self.host
                .default_output_device()
                .ok_or(RecorderError::CaptureUnavailable {
                    reason: "No output device available for loopback capture".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        let config = output_config(&device)?;
        Ok((device, config))
    }

    #[cfg(not(target_os = "windows"))]
    #[track_caller]
    fn open_system_audio(&self) -> CoreResult<(Device, SupportedStreamConfig)> {
        let inputs = self
            .host
            .input_devices()
            .map_err(|e| RecorderError::CaptureUnavailable {
                reason: format!("Failed to enumerate input devices: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        for device in inputs {
            let Some(name) = device_name(&device) else {
                continue;
            };
            if name.to_lowercase().contains(MONITOR_MARKER) {
                debug!(device = %name, "Using monitor source for system audio");
                let config = input_config(&device)?;
                return Ok((device, config));
            }
        }

        Err(RecorderError::CaptureUnavailable {
            reason: "No system audio monitor device found; set capture.device to a loopback device"
                .to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl Default for CpalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureProvider for CpalProvider {
    #[track_caller]
    #[instrument(skip(self))]
    fn request(&mut self, request: &CaptureRequest) -> CoreResult<Box<dyn ChunkRecorder>> {
        let (device, config) = self.open(request)?;

        info!(
            device = device_name(&device).as_deref().unwrap_or("unknown"),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Capture stream granted"
        );

        Ok(Box::new(CpalRecorder::new(
            device,
            config.into(),
            request.chunk_interval,
        )))
    }
}

#[allow(deprecated)]
fn device_name(device: &Device) -> Option<String> {
    device.name().ok()
}

#[track_caller]
fn input_config(device: &Device) -> CoreResult<SupportedStreamConfig> {
    device
        .default_input_config()
        .map_err(|e| RecorderError::CaptureUnavailable {
            reason: format!("Failed to get input config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[cfg(target_os = "windows")]
#[track_caller]
fn output_config(device: &Device) -> CoreResult<SupportedStreamConfig> {
    device
        .default_output_config()
        .map_err(|e| RecorderError::CaptureUnavailable {
            reason: format!("Failed to get output config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}
