use crate::{CaptureError, CaptureResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use error_location::ErrorLocation;
use tracing::error;

/// Maximum samples to buffer (5 minutes at 48kHz mono).
/// Prevents unbounded memory growth during long recordings.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Samples retained for the analyzer's waveform view.
pub(crate) const WAVEFORM_WINDOW: usize = 2048;

/// Ordered encoded-chunk accumulator with a drop-oldest cap.
#[derive(Debug, Default)]
pub(crate) struct ChunkBuffer {
    chunks: VecDeque<Vec<f32>>,
    total: usize,
}

impl ChunkBuffer {
    pub(crate) fn push(&mut self, chunk: Vec<f32>) {
        if chunk.is_empty() {
            return;
        }
        self.total += chunk.len();
        self.chunks.push_back(chunk);
        while self.total > MAX_BUFFER_SAMPLES {
            match self.chunks.pop_front() {
                Some(oldest) => self.total -= oldest.len(),
                None => break,
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.total
    }

    pub(crate) fn take_samples(&mut self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.total);
        for chunk in self.chunks.drain(..) {
            samples.extend_from_slice(&chunk);
        }
        self.total = 0;
        samples
    }
}

/// State shared between the audio callback, the session and its taps.
#[derive(Debug)]
pub(crate) struct CaptureShared {
    active: AtomicBool,
    chunks: Mutex<ChunkBuffer>,
    window: Mutex<VecDeque<f32>>,
    reads: AtomicU64,
}

impl CaptureShared {
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            chunks: Mutex::new(ChunkBuffer::default()),
            window: Mutex::new(VecDeque::with_capacity(WAVEFORM_WINDOW)),
            reads: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub(crate) fn take_samples(&self) -> Vec<f32> {
        recover(&self.chunks).take_samples()
    }
}

// Recover from lock poison rather than silently dropping audio. The buffers
// are still valid after a holder panicked.
fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| {
        error!("Capture buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

/// Write side handed to a [`crate::CaptureBackend`]; called from the audio thread.
#[derive(Debug, Clone)]
pub struct SampleSink {
    shared: Arc<CaptureShared>,
}

impl SampleSink {
    pub(crate) fn new(shared: Arc<CaptureShared>) -> Self {
        Self { shared }
    }

    /// Append one chunk of mono samples.
    ///
    /// Ignored once the owning session has stopped, so a callback that fires
    /// after release never writes into a finished recording.
    pub fn push(&self, chunk: Vec<f32>) {
        if !self.shared.is_active() {
            return;
        }

        {
            let mut window = recover(&self.shared.window);
            window.extend(chunk.iter().copied());
            let excess = window.len().saturating_sub(WAVEFORM_WINDOW);
            if excess > 0 {
                window.drain(..excess);
            }
        }

        recover(&self.shared.chunks).push(chunk);
    }

    /// Whether the owning session is still recording.
    pub fn is_open(&self) -> bool {
        self.shared.is_active()
    }
}

/// Read-only view of a live session's stream, used for visual feedback.
#[derive(Debug, Clone)]
pub struct StreamTap {
    shared: Arc<CaptureShared>,
}

impl StreamTap {
    pub(crate) fn new(shared: Arc<CaptureShared>) -> Self {
        Self { shared }
    }

    /// Whether the session behind this tap is still capturing.
    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    /// Copy of the most recent waveform samples, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::StreamClosed`] once the session has stopped.
    #[track_caller]
    pub fn waveform(&self) -> CaptureResult<Vec<f32>> {
        if !self.shared.is_active() {
            return Err(CaptureError::StreamClosed {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.shared.reads.fetch_add(1, Ordering::Relaxed);
        Ok(recover(&self.shared.window).iter().copied().collect())
    }

    /// Number of successful waveform reads made through any clone of this tap.
    pub fn read_count(&self) -> u64 {
        self.shared.reads.load(Ordering::Relaxed)
    }

    /// Number of samples currently buffered for the payload.
    pub fn buffered_samples(&self) -> usize {
        recover(&self.shared.chunks).len()
    }
}
