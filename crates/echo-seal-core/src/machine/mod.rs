mod notice;
mod phase;
mod state_machine;

pub use {
    notice::{DEFAULT_TOAST_TTL, ToastKind, ToastNotification},
    phase::RecordingPhase,
    state_machine::{RecordingStateMachine, SubmissionTicket},
};
