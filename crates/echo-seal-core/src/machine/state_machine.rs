use crate::{AudioPayload, Credential, RecordingPhase, SealArtifact, TransitionError};

use std::{mem, panic::Location};

use error_location::ErrorLocation;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Internal state, carrying what each phase owns.
#[derive(Debug)]
enum SessionState {
    Idle,
    Recording {
        session_id: Uuid,
    },
    AwaitingCredential {
        payload: AudioPayload,
    },
    Submitting {
        session_id: Uuid,
    },
    Succeeded {
        session_id: Uuid,
        artifact: SealArtifact,
    },
    Failed {
        session_id: Uuid,
        reason: String,
    },
}

impl SessionState {
    fn phase(&self) -> RecordingPhase {
        match self {
            SessionState::Idle => RecordingPhase::Idle,
            SessionState::Recording { .. } => RecordingPhase::Recording,
            SessionState::AwaitingCredential { .. } => RecordingPhase::AwaitingCredential,
            SessionState::Submitting { .. } => RecordingPhase::Submitting,
            SessionState::Succeeded { .. } => RecordingPhase::Succeeded,
            SessionState::Failed { .. } => RecordingPhase::Failed,
        }
    }
}

/// Everything needed to send one submission, handed out by
/// [`RecordingStateMachine::submit`].
#[derive(Debug)]
pub struct SubmissionTicket {
    payload: AudioPayload,
    credential: Credential,
}

impl SubmissionTicket {
    /// Session the submission belongs to.
    pub fn session_id(&self) -> Uuid {
        self.payload.session_id()
    }

    /// Split into the payload and the credential.
    pub fn into_parts(self) -> (AudioPayload, Credential) {
        (self.payload, self.credential)
    }
}

/// The linear recording workflow a UI renders against.
///
/// ```text
/// Idle --start--> Recording --stop--> AwaitingCredential --submit--> Submitting
///                     |                       |                        |    |
///                   abort                   cancel               succeed    fail
///                     v                       v                     v       v
///                   Idle                    Idle              Succeeded  Failed --reset--> Idle
/// ```
///
/// The machine holds no resources. The finished payload moves in on `stop`
/// and out on `submit` or `cancel`; results arriving for a session the
/// machine has moved past are ignored.
#[derive(Debug)]
pub struct RecordingStateMachine {
    state: SessionState,
}

impl Default for RecordingStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStateMachine {
    /// Machine in [`RecordingPhase::Idle`].
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RecordingPhase {
        self.state.phase()
    }

    /// Session the machine is currently tracking, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Recording { session_id }
            | SessionState::Submitting { session_id }
            | SessionState::Succeeded { session_id, .. }
            | SessionState::Failed { session_id, .. } => Some(*session_id),
            SessionState::AwaitingCredential { payload } => Some(payload.session_id()),
        }
    }

    /// Artifact of a successful session.
    pub fn artifact(&self) -> Option<&SealArtifact> {
        match &self.state {
            SessionState::Succeeded { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// User-facing reason of a failed session.
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    #[track_caller]
    fn reject(&self, event: &'static str) -> TransitionError {
        TransitionError::InvalidTransition {
            from: self.phase(),
            event,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// `Idle -> Recording`.
    ///
    /// # Errors
    ///
    /// [`TransitionError::InvalidTransition`] unless idle.
    #[track_caller]
    pub fn start(&mut self, session_id: Uuid) -> Result<(), TransitionError> {
        if !matches!(self.state, SessionState::Idle) {
            return Err(self.reject("start"));
        }

        self.state = SessionState::Recording { session_id };
        info!(session_id = %session_id, "Recording");
        Ok(())
    }

    /// Whether [`Self::start`] would be accepted.
    pub fn can_start(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// `Recording -> AwaitingCredential`, taking ownership of the payload.
    ///
    /// Only call after the capture session has been released.
    ///
    /// # Errors
    ///
    /// [`TransitionError::InvalidTransition`] unless recording the payload's
    /// session.
    #[track_caller]
    pub fn stop(&mut self, payload: AudioPayload) -> Result<(), TransitionError> {
        match self.state {
            SessionState::Recording { session_id } if session_id == payload.session_id() => {
                info!(session_id = %session_id, duration = ?payload.duration(), "Awaiting credential");
                self.state = SessionState::AwaitingCredential { payload };
                Ok(())
            }
            _ => Err(self.reject("stop")),
        }
    }

    /// `Recording -> Idle`, for a recording that produced no payload.
    ///
    /// # Errors
    ///
    /// [`TransitionError::InvalidTransition`] unless recording.
    #[track_caller]
    pub fn abort(&mut self) -> Result<(), TransitionError> {
        if !matches!(self.state, SessionState::Recording { .. }) {
            return Err(self.reject("abort"));
        }

        debug!("Recording aborted");
        self.state = SessionState::Idle;
        Ok(())
    }

    /// `AwaitingCredential -> Submitting`.
    ///
    /// An empty or whitespace-only credential is rejected and the machine
    /// stays in `AwaitingCredential` with the payload intact.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::InvalidTransition`] unless awaiting a credential.
    /// - [`TransitionError::EmptyCredential`] for a blank credential.
    #[track_caller]
    pub fn submit(&mut self, credential: String) -> Result<SubmissionTicket, TransitionError> {
        if !matches!(self.state, SessionState::AwaitingCredential { .. }) {
            return Err(self.reject("submit"));
        }

        let Some(credential) = Credential::parse(credential) else {
            warn!("Rejected empty credential");
            return Err(TransitionError::EmptyCredential {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::AwaitingCredential { payload } => {
                let session_id = payload.session_id();
                self.state = SessionState::Submitting { session_id };
                info!(session_id = %session_id, "Submitting");
                Ok(SubmissionTicket {
                    payload,
                    credential,
                })
            }
            other => {
                self.state = other;
                Err(self.reject("submit"))
            }
        }
    }

    /// `AwaitingCredential -> Idle`, discarding the payload.
    ///
    /// # Errors
    ///
    /// [`TransitionError::InvalidTransition`] unless awaiting a credential.
    #[track_caller]
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        if !matches!(self.state, SessionState::AwaitingCredential { .. }) {
            return Err(self.reject("cancel"));
        }

        self.state = SessionState::Idle;
        info!("Submission cancelled; payload discarded");
        Ok(())
    }

    /// `Submitting -> Succeeded` for `session_id`.
    ///
    /// Returns `false`, leaving the machine untouched, when `session_id` is
    /// not the session being submitted.
    pub fn succeed(&mut self, session_id: Uuid, artifact: SealArtifact) -> bool {
        match self.state {
            SessionState::Submitting { session_id: current } if current == session_id => {
                info!(session_id = %session_id, artifact_id = %artifact.id(), "Succeeded");
                self.state = SessionState::Succeeded {
                    session_id,
                    artifact,
                };
                true
            }
            _ => {
                debug!(session_id = %session_id, phase = ?self.phase(), "Ignoring stale success");
                false
            }
        }
    }

    /// `Submitting -> Failed` for `session_id`.
    ///
    /// Returns `false`, leaving the machine untouched, when `session_id` is
    /// not the session being submitted.
    pub fn fail(&mut self, session_id: Uuid, reason: impl Into<String>) -> bool {
        match self.state {
            SessionState::Submitting { session_id: current } if current == session_id => {
                let reason = reason.into();
                warn!(session_id = %session_id, reason = %reason, "Failed");
                self.state = SessionState::Failed {
                    session_id,
                    reason,
                };
                true
            }
            _ => {
                debug!(session_id = %session_id, phase = ?self.phase(), "Ignoring stale failure");
                false
            }
        }
    }

    /// `Succeeded | Failed -> Idle`.
    ///
    /// # Errors
    ///
    /// [`TransitionError::InvalidTransition`] unless in a terminal phase.
    #[track_caller]
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if !self.phase().is_terminal() {
            return Err(self.reject("reset"));
        }

        self.state = SessionState::Idle;
        debug!("Reset to idle");
        Ok(())
    }
}
