use crate::{
    CaptureError, CaptureResult,
    audio::{ActiveStream, CaptureBackend, SampleSink, StreamFormat},
};

use std::{fmt::Display, panic::Location};

use cpal::{
    Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Fragments of backend error text that indicate an access refusal.
const PERMISSION_MARKERS: [&str; 4] = ["permission", "denied", "not authorized", "unauthorized"];

/// Microphone backend on the platform's default CPAL host.
#[derive(Debug, Clone, Default)]
pub struct CpalBackend {
    device_name: Option<String>,
}

impl CpalBackend {
    /// Use the named input device, or the default input when `None` or not found.
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    #[track_caller]
    fn resolve_device(&self) -> CaptureResult<Device> {
        let host = cpal::default_host();

        if let Some(wanted) = &self.device_name {
            match host.input_devices() {
                Ok(mut devices) => {
                    #[allow(deprecated)]
                    let found = devices.find(|d| d.name().is_ok_and(|name| &name == wanted));
                    if let Some(device) = found {
                        return Ok(device);
                    }
                    warn!(device = %wanted, "Configured input device not found, using default");
                }
                Err(e) => warn!(error = %e, "Failed to enumerate input devices"),
            }
        }

        host.default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl CaptureBackend for CpalBackend {
    #[track_caller]
    #[instrument(skip(self, sink))]
    fn open(&self, sink: SampleSink) -> CaptureResult<Box<dyn ActiveStream>> {
        let device = self.resolve_device()?;

        let supported = device
            .default_input_config()
            .map_err(|e| acquisition_error("Failed to get config", e))?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            sample_format = ?sample_format,
            "Opening input stream"
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, sink)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, sink)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, sink)?,
            other => {
                return Err(CaptureError::DeviceUnavailable {
                    reason: format!("Unsupported sample format: {:?}", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        stream
            .play()
            .map_err(|e| acquisition_error("Failed to start stream", e))?;

        Ok(Box::new(CpalStream {
            stream: Some(stream),
            format: StreamFormat {
                sample_rate: config.sample_rate,
            },
        }))
    }
}

#[track_caller]
fn build_stream<T>(device: &Device, config: &StreamConfig, sink: SampleSink) -> CaptureResult<Stream>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if !sink.is_open() {
                    return;
                }
                // Downmix interleaved frames to mono.
                let mono: Vec<f32> = data
                    .chunks(channels)
                    .map(|frame| {
                        frame.iter().map(|s| s.to_sample::<f32>()).sum::<f32>()
                            / frame.len() as f32
                    })
                    .collect();
                sink.push(mono);
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| acquisition_error("Failed to build stream", e))
}

/// Classify a backend failure as a permission refusal or an unavailable device.
#[track_caller]
pub(crate) fn acquisition_error(context: &str, err: impl Display) -> CaptureError {
    let reason = format!("{}: {}", context, err);
    let lowered = reason.to_lowercase();
    let location = ErrorLocation::from(Location::caller());

    if PERMISSION_MARKERS.iter().any(|m| lowered.contains(m)) {
        CaptureError::PermissionDenied { reason, location }
    } else {
        CaptureError::DeviceUnavailable { reason, location }
    }
}

struct CpalStream {
    stream: Option<Stream>,
    format: StreamFormat,
}

impl ActiveStream for CpalStream {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!(error = %e, "Pause before release failed");
            }
            // The sink is closed before release; a callback still in flight
            // finds it inactive and writes nothing.
            drop(stream);
            debug!("Input stream dropped");
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.release();
    }
}
