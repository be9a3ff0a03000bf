use crate::{CaptureResult, audio::SampleSink};

/// Format of the mono sample stream delivered to a [`SampleSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Samples per second.
    pub sample_rate: u32,
}

/// Microphone acquisition primitive.
///
/// `open` acquires the device and starts delivering mono `f32` samples to
/// `sink` until the returned stream is released. Implementations map refusals
/// to [`crate::CaptureError::PermissionDenied`] and every other acquisition
/// failure to [`crate::CaptureError::DeviceUnavailable`].
pub trait CaptureBackend {
    /// Acquire the input device and begin streaming into `sink`.
    fn open(&self, sink: SampleSink) -> CaptureResult<Box<dyn ActiveStream>>;
}

/// A live device acquisition: its tracks and processing context.
pub trait ActiveStream {
    /// Format of the samples being delivered.
    fn format(&self) -> StreamFormat;

    /// Stop every device track and close the processing context.
    ///
    /// Must be idempotent; callers may release more than once.
    fn release(&mut self);
}
