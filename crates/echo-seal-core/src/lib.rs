//! Echo Seal core library
//!
//! Records a short voice message, hands it to a sealing service that hides it
//! in an image, and decodes such images back into text. Microphone capture
//! runs on CPAL; the services are reached over HTTP with reqwest.
//!
//! # Example
//!
//! ```no_run
//! use echo_seal_core::{
//!     AudioCapture, ControllerOptions, CpalBackend, DEFAULT_TIMEOUT, HistoryStore,
//!     MemoryBackend, SealController, SealPipeline, SealVault, ServiceClient,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ServiceClient::new("http://localhost:8000", DEFAULT_TIMEOUT)?;
//! let history = HistoryStore::open(Box::new(MemoryBackend::default()))?.into_shared();
//! let pipeline = SealPipeline::new(client, history, SealVault::new("seals"));
//! let capture = AudioCapture::new(Box::new(CpalBackend::new(None)));
//!
//! let (ui_tx, _ui_rx) = tokio::sync::mpsc::unbounded_channel();
//! let (mut controller, mut events) =
//!     SealController::new(capture, pipeline, ControllerOptions::default(), ui_tx);
//!
//! controller.start()?;
//! tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//! controller.stop()?;
//! controller.submit("hunter2".to_string())?;
//!
//! while let Some(event) = events.recv().await {
//!     controller.handle(event);
//!     if controller.phase().is_terminal() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod audio;
mod controller;
mod error;
mod history;
mod machine;
mod service;

pub use {
    audio::{
        ActiveStream, AudioCapture, AudioPayload, BAR_COUNT, CaptureBackend, CaptureSession,
        ClockTask, CpalBackend, FFT_SIZE, FRAME_INTERVAL, FrameLoop, LEVEL_HIGH_THRESHOLD,
        LEVEL_MEDIUM_THRESHOLD, PAYLOAD_FILE_NAME, PAYLOAD_MIME, RecordingClock, SampleSink,
        SignalAnalyzer, SignalFrame, SignalLevel, StreamFormat, StreamTap, TICK_PERIOD, amplitude,
        format_elapsed,
    },
    controller::{
        ControllerEvent, ControllerEvents, ControllerOptions, DEFAULT_MAX_RECORDING_SECS,
        NOTICE_SEAL_CREATED, SealController, UiEvent,
    },
    error::{
        CaptureError, CaptureResult, ControllerError, DecodeError, HistoryError, HistoryResult,
        NOTICE_CONNECTION_FAILED, NOTICE_DECODE_FAILED, NOTICE_EMPTY_CREDENTIAL,
        NOTICE_PERMISSION_DENIED, NOTICE_SEAL_FAILED, NOTICE_UNSUPPORTED_FORMAT, SubmissionError,
        TransitionError,
    },
    history::{
        HISTORY_CAPACITY, HistoryBackend, HistoryStore, JsonFileBackend, MemoryBackend,
        STORAGE_KEY, SealArtifact, SealVault, SharedHistory,
    },
    machine::{
        DEFAULT_TOAST_TTL, RecordingPhase, RecordingStateMachine, SubmissionTicket, ToastKind,
        ToastNotification,
    },
    service::{
        Credential, DEFAULT_TIMEOUT, DecodePipeline, SEAL_PATH, SealPipeline, ServiceClient,
        UNSEAL_PATH, check_image_format,
    },
};

#[cfg(test)]
mod tests;
