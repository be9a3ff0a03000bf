//! Fakes shared by the unit tests: a scripted capture device and a stub HTTP
//! service.

use crate::{
    ActiveStream, AudioPayload, CaptureBackend, CaptureError, CaptureResult, SampleSink,
    StreamFormat, audio::encoder::encode_wav,
};

use std::{
    io::Cursor,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Router, body::Bytes, http::StatusCode, http::header, routing::post};
use chrono::Utc;
use error_location::ErrorLocation;
use image::{DynamicImage, ImageFormat};
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;

pub(crate) const SAMPLE_RATE: u32 = 16_000;

/// Observable state of the fake microphone.
#[derive(Default)]
pub(crate) struct FakeDevice {
    opened: AtomicUsize,
    active_tracks: AtomicUsize,
    context_closed: AtomicBool,
    sink: Mutex<Option<SampleSink>>,
}

impl FakeDevice {
    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn active_tracks(&self) -> usize {
        self.active_tracks.load(Ordering::SeqCst)
    }

    pub(crate) fn context_closed(&self) -> bool {
        self.context_closed.load(Ordering::SeqCst)
    }

    /// Deliver samples as the audio callback would.
    pub(crate) fn push(&self, samples: Vec<f32>) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.push(samples);
        }
    }
}

/// How the fake device answers an open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeMode {
    /// Opens and immediately delivers one chunk of tone.
    Tone,
    /// Opens but never delivers audio.
    Silent,
    /// Refuses access.
    Denied,
}

pub(crate) struct FakeBackend {
    device: Arc<FakeDevice>,
    mode: FakeMode,
}

impl FakeBackend {
    pub(crate) fn new(mode: FakeMode) -> (Self, Arc<FakeDevice>) {
        let device = Arc::new(FakeDevice::default());
        (
            Self {
                device: Arc::clone(&device),
                mode,
            },
            device,
        )
    }
}

impl CaptureBackend for FakeBackend {
    fn open(&self, sink: SampleSink) -> CaptureResult<Box<dyn ActiveStream>> {
        if self.mode == FakeMode::Denied {
            return Err(CaptureError::PermissionDenied {
                reason: "user refused".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.device.opened.fetch_add(1, Ordering::SeqCst);
        self.device.active_tracks.fetch_add(1, Ordering::SeqCst);
        self.device.context_closed.store(false, Ordering::SeqCst);

        if self.mode == FakeMode::Tone {
            sink.push(tone(SAMPLE_RATE as usize / 10, 0.25));
        }
        *self.device.sink.lock().unwrap() = Some(sink);

        Ok(Box::new(FakeStream {
            device: Arc::clone(&self.device),
            released: false,
        }))
    }
}

struct FakeStream {
    device: Arc<FakeDevice>,
    released: bool,
}

impl ActiveStream for FakeStream {
    fn format(&self) -> StreamFormat {
        StreamFormat {
            sample_rate: SAMPLE_RATE,
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.device.active_tracks.fetch_sub(1, Ordering::SeqCst);
        self.device.context_closed.store(true, Ordering::SeqCst);
        self.device.sink.lock().unwrap().take();
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// `len` samples of a 440Hz sine at `gain`.
pub(crate) fn tone(len: usize, gain: f32) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            gain * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect()
}

/// A short payload for a fresh session id.
pub(crate) fn payload() -> AudioPayload {
    encode_wav(Uuid::new_v4(), Utc::now(), &tone(1600, 0.25), SAMPLE_RATE).unwrap()
}

/// A real 2x2 PNG.
pub(crate) fn png_bytes() -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::new_rgba8(2, 2)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// Stub sealing/unsealing service answering every request the same way.
pub(crate) struct StubService {
    pub(crate) base_url: String,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl StubService {
    pub(crate) async fn spawn(
        status: StatusCode,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> Self {
        Self::spawn_delayed(status, content_type, body, Duration::ZERO).await
    }

    pub(crate) async fn spawn_delayed(
        status: StatusCode,
        content_type: &'static str,
        body: Vec<u8>,
        delay: Duration,
    ) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_body = Arc::new(Mutex::new(Vec::new()));

        let reply = {
            let hits = Arc::clone(&hits);
            let last_body = Arc::clone(&last_body);
            move |request: Bytes| {
                let hits = Arc::clone(&hits);
                let last_body = Arc::clone(&last_body);
                let body = body.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    *last_body.lock().unwrap() = request.to_vec();
                    tokio::time::sleep(delay).await;
                    (status, [(header::CONTENT_TYPE, content_type)], body)
                }
            }
        };

        let app = Router::new()
            .route("/create-seal", post(reply.clone()))
            .route("/unseal", post(reply));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            last_body,
            handle,
        }
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub(crate) fn last_body(&self) -> Vec<u8> {
        self.last_body.lock().unwrap().clone()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A base URL nothing is listening on.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
