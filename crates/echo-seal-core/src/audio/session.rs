use crate::{
    CaptureError, CaptureResult,
    audio::{
        ActiveStream, AudioPayload, CaptureBackend, SampleSink, StreamFormat, StreamTap,
        buffer::CaptureShared, encoder::encode_wav,
    },
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Owns the capture backend and enforces one live session at a time.
pub struct AudioCapture {
    backend: Box<dyn CaptureBackend>,
    live: Arc<AtomicBool>,
}

impl AudioCapture {
    /// Wrap a capture backend.
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            live: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a session is currently live.
    pub fn is_active(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Acquire the capture device and begin buffering audio.
    ///
    /// No clock or analyzer is started; callers wire those against
    /// [`CaptureSession::tap`].
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::SessionAlreadyActive`] if a session is live,
    /// leaving it untouched, or the backend's acquisition error.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&self) -> CaptureResult<CaptureSession> {
        let slot = SessionSlot::claim(&self.live)?;

        let shared = Arc::new(CaptureShared::new());
        let stream = self.backend.open(SampleSink::new(Arc::clone(&shared)))?;
        let format = stream.format();

        let session = CaptureSession {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            format,
            stream: Some(stream),
            shared,
            _slot: slot,
        };

        info!(
            session_id = %session.id,
            sample_rate = format.sample_rate,
            "Capture session started"
        );

        Ok(session)
    }
}

/// Marks the single live-session slot as taken until dropped.
struct SessionSlot {
    live: Arc<AtomicBool>,
}

impl SessionSlot {
    #[track_caller]
    fn claim(live: &Arc<AtomicBool>) -> CaptureResult<Self> {
        live.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CaptureError::SessionAlreadyActive {
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            live: Arc::clone(live),
        })
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}

/// One in-flight microphone acquisition.
///
/// The device is released by [`CaptureSession::stop`] or, on any other exit
/// path, when the session is dropped.
pub struct CaptureSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    format: StreamFormat,
    stream: Option<Box<dyn ActiveStream>>,
    shared: Arc<CaptureShared>,
    // Dropped after `Drop::drop` has released the stream.
    _slot: SessionSlot,
}

impl CaptureSession {
    /// Unique id of this session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the device was acquired.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Format of the captured stream.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Handle for analyzers; stops yielding data once the session stops.
    pub fn tap(&self) -> StreamTap {
        StreamTap::new(Arc::clone(&self.shared))
    }

    /// Release the device, then assemble the buffered chunks into a payload.
    ///
    /// Release happens before encoding and regardless of the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoAudioCaptured`] for an empty recording or
    /// [`CaptureError::EncodingFailed`] if WAV assembly fails.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn stop(mut self) -> CaptureResult<AudioPayload> {
        self.release();

        let samples = self.shared.take_samples();
        debug!(sample_count = samples.len(), "Captured audio samples");

        if samples.is_empty() {
            return Err(CaptureError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        encode_wav(self.id, self.started_at, &samples, self.format.sample_rate)
    }

    fn release(&mut self) {
        // Close the taps and the sink before the device goes away so no
        // reader or late callback touches a released stream.
        self.shared.deactivate();

        if let Some(mut stream) = self.stream.take() {
            stream.release();
            info!(session_id = %self.id, "Capture device released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
