pub(crate) mod analyzer;
mod backend;
pub(crate) mod buffer;
mod clock;
pub(crate) mod cpal_backend;
pub(crate) mod encoder;
mod session;

pub use {
    analyzer::{
        BAR_COUNT, FFT_SIZE, FRAME_INTERVAL, FrameLoop, LEVEL_HIGH_THRESHOLD,
        LEVEL_MEDIUM_THRESHOLD, SignalAnalyzer, SignalFrame, SignalLevel, amplitude,
    },
    backend::{ActiveStream, CaptureBackend, StreamFormat},
    buffer::{SampleSink, StreamTap},
    clock::{ClockTask, RecordingClock, TICK_PERIOD, format_elapsed},
    cpal_backend::CpalBackend,
    encoder::{AudioPayload, PAYLOAD_FILE_NAME, PAYLOAD_MIME},
    session::{AudioCapture, CaptureSession},
};
