//! Drives one recording workflow: capture, feedback loops, state machine and
//! submission.

use crate::{
    AudioCapture, CaptureSession, ClockTask, ControllerError, FRAME_INTERVAL, FrameLoop,
    RecordingPhase, RecordingStateMachine, SealArtifact, SealPipeline, SignalFrame,
    SubmissionError, TICK_PERIOD, ToastNotification, TransitionError,
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default cap on a single recording, in seconds.
pub const DEFAULT_MAX_RECORDING_SECS: u64 = 120;

/// Notice shown after a seal is stored.
pub const NOTICE_SEAL_CREATED: &str = "Seal created successfully!";

/// Updates for the presentation layer.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// The workflow moved to a new phase.
    PhaseChanged(RecordingPhase),
    /// Whole seconds recorded so far.
    Elapsed(u64),
    /// Latest signal frame.
    Signal(SignalFrame),
    /// A transient notice.
    Toast(ToastNotification),
    /// A seal was created and added to history.
    Sealed(SealArtifact),
}

/// Results of background work, fed back through [`SealController::handle`].
#[derive(Debug)]
pub enum ControllerEvent {
    /// One clock tick of a recording.
    ClockTick {
        /// Recording the tick belongs to.
        session_id: Uuid,
        /// Seconds elapsed.
        elapsed: u64,
    },
    /// A submission finished.
    SubmissionFinished {
        /// Recording the submission belongs to.
        session_id: Uuid,
        /// Outcome.
        result: Result<SealArtifact, SubmissionError>,
    },
}

/// Receiving side of the controller's background events.
pub struct ControllerEvents {
    rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl ControllerEvents {
    /// Next event; `None` once the controller is dropped.
    pub async fn recv(&mut self) -> Option<ControllerEvent> {
        self.rx.recv().await
    }
}

/// Timing knobs.
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Clock tick period.
    pub tick_period: Duration,
    /// Analyzer frame period.
    pub frame_period: Duration,
    /// Recording auto-stops after this many ticks; 0 disables the cap.
    pub max_recording_secs: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tick_period: TICK_PERIOD,
            frame_period: FRAME_INTERVAL,
            max_recording_secs: DEFAULT_MAX_RECORDING_SECS,
        }
    }
}

/// A live recording and the loops feeding it to the UI.
struct ActiveRecording {
    session: CaptureSession,
    clock: ClockTask,
    frames: FrameLoop,
}

/// Owns the state machine and translates every external callback into one
/// transition.
///
/// All methods are synchronous; background work reports back through
/// [`ControllerEvents`], which the owner passes to [`Self::handle`].
pub struct SealController {
    capture: AudioCapture,
    pipeline: SealPipeline,
    machine: RecordingStateMachine,
    options: ControllerOptions,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    active: Option<ActiveRecording>,
}

impl SealController {
    /// Create a controller in [`RecordingPhase::Idle`].
    pub fn new(
        capture: AudioCapture,
        pipeline: SealPipeline,
        options: ControllerOptions,
        ui_tx: mpsc::UnboundedSender<UiEvent>,
    ) -> (Self, ControllerEvents) {
        let (events_tx, rx) = mpsc::unbounded_channel();

        let controller = Self {
            capture,
            pipeline,
            machine: RecordingStateMachine::new(),
            options,
            ui_tx,
            events_tx,
            active: None,
        };

        (controller, ControllerEvents { rx })
    }

    /// Current phase.
    pub fn phase(&self) -> RecordingPhase {
        self.machine.phase()
    }

    /// The state machine, for inspection.
    pub fn machine(&self) -> &RecordingStateMachine {
        &self.machine
    }

    /// The pipeline, for access to history.
    pub fn pipeline(&self) -> &SealPipeline {
        &self.pipeline
    }

    /// Whether a capture session is live.
    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    fn emit(&self, event: UiEvent) {
        if self.ui_tx.send(event).is_err() {
            debug!("UI receiver dropped");
        }
    }

    fn toast(&self, toast: ToastNotification) {
        self.emit(UiEvent::Toast(toast));
    }

    fn set_phase(&self) {
        self.emit(UiEvent::PhaseChanged(self.machine.phase()));
    }

    #[track_caller]
    fn rejected(&self, event: &'static str) -> ControllerError {
        ControllerError::from(TransitionError::InvalidTransition {
            from: self.machine.phase(),
            event,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Begin recording.
    ///
    /// A capture failure leaves the machine idle and raises a notice.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Transition`] unless idle.
    /// - [`ControllerError::Capture`] if the device cannot be acquired.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<Uuid, ControllerError> {
        if !self.machine.can_start() {
            return Err(self.rejected("start"));
        }

        let session = match self.capture.start() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Capture failed to start");
                self.toast(ToastNotification::error(e.notice_text()));
                return Err(e.into());
            }
        };
        let session_id = session.id();

        self.machine.start(session_id)?;

        let events_tx = self.events_tx.clone();
        let clock = ClockTask::spawn(self.options.tick_period, move |elapsed| {
            events_tx
                .send(ControllerEvent::ClockTick {
                    session_id,
                    elapsed,
                })
                .is_ok()
        });

        let ui_tx = self.ui_tx.clone();
        let frames = FrameLoop::spawn(session.tap(), self.options.frame_period, move |frame| {
            ui_tx.send(UiEvent::Signal(frame)).is_ok()
        });

        self.active = Some(ActiveRecording {
            session,
            clock,
            frames,
        });

        self.set_phase();
        self.emit(UiEvent::Elapsed(0));
        Ok(session_id)
    }

    /// Stop recording and wait for a credential.
    ///
    /// The device is released before the machine leaves `Recording`. An empty
    /// recording returns the machine to idle.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Transition`] unless recording.
    /// - [`ControllerError::Capture`] if no payload could be produced.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> Result<(), ControllerError> {
        let Some(active) = self.active.take() else {
            return Err(self.rejected("stop"));
        };

        let ActiveRecording {
            session,
            clock,
            frames,
        } = active;
        drop(clock);
        drop(frames);

        match session.stop() {
            Ok(payload) => {
                self.machine.stop(payload)?;
                self.set_phase();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Recording produced no payload");
                self.machine.abort()?;
                self.set_phase();
                self.toast(ToastNotification::warning(e.notice_text()));
                Err(e.into())
            }
        }
    }

    /// Submit the finished recording with `credential`.
    ///
    /// A blank credential raises a warning and keeps the machine waiting.
    ///
    /// # Errors
    ///
    /// [`ControllerError::Transition`] unless awaiting a credential, or for a
    /// blank credential.
    #[instrument(skip(self, credential))]
    pub fn submit(&mut self, credential: String) -> Result<(), ControllerError> {
        let ticket = match self.machine.submit(credential) {
            Ok(ticket) => ticket,
            Err(e) => {
                if matches!(e, TransitionError::EmptyCredential { .. }) {
                    self.toast(ToastNotification::warning(e.notice_text()));
                }
                return Err(e.into());
            }
        };

        let (payload, credential) = ticket.into_parts();
        let session_id = payload.session_id();
        let pipeline = self.pipeline.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = pipeline.submit(payload, credential.expose()).await;
            drop(credential);

            if events_tx
                .send(ControllerEvent::SubmissionFinished { session_id, result })
                .is_err()
            {
                debug!(session_id = %session_id, "Controller gone before submission finished");
            }
        });

        self.set_phase();
        Ok(())
    }

    /// Discard the finished recording.
    ///
    /// # Errors
    ///
    /// [`ControllerError::Transition`] unless awaiting a credential.
    pub fn cancel(&mut self) -> Result<(), ControllerError> {
        self.machine.cancel()?;
        self.set_phase();
        self.toast(ToastNotification::info("Recording discarded"));
        Ok(())
    }

    /// Return to idle after a result.
    ///
    /// # Errors
    ///
    /// [`ControllerError::Transition`] unless succeeded or failed.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.machine.reset()?;
        self.set_phase();
        Ok(())
    }

    /// Apply a background event. Events for a session the machine has moved
    /// past are dropped.
    pub fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::ClockTick {
                session_id,
                elapsed,
            } => self.on_tick(session_id, elapsed),
            ControllerEvent::SubmissionFinished { session_id, result } => {
                self.on_submission(session_id, result)
            }
        }
    }

    fn on_tick(&mut self, session_id: Uuid, elapsed: u64) {
        let current = self.active.as_ref().map(|a| a.session.id());
        if current != Some(session_id) {
            debug!(session_id = %session_id, "Ignoring stale clock tick");
            return;
        }

        self.emit(UiEvent::Elapsed(elapsed));

        let max = self.options.max_recording_secs;
        if max > 0 && elapsed >= max {
            info!(session_id = %session_id, elapsed, "Maximum recording length reached");
            self.toast(ToastNotification::info("Maximum recording length reached"));
            if let Err(e) = self.stop() {
                debug!(error = %e, "Auto-stop ended without payload");
            }
        }
    }

    fn on_submission(&mut self, session_id: Uuid, result: Result<SealArtifact, SubmissionError>) {
        match result {
            Ok(artifact) => {
                if self.machine.succeed(session_id, artifact.clone()) {
                    self.set_phase();
                    self.toast(ToastNotification::success(NOTICE_SEAL_CREATED));
                    self.emit(UiEvent::Sealed(artifact));
                }
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Submission failed");
                let notice = e.notice_text();
                if self.machine.fail(session_id, notice.clone()) {
                    self.set_phase();
                    self.toast(ToastNotification::error(notice));
                }
            }
        }
    }

    /// Release any live capture session.
    pub fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            info!(session_id = %active.session.id(), "Releasing capture on shutdown");
            drop(active);
        }
    }
}
