/// Observable phase of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingPhase {
    /// Nothing in progress.
    Idle,
    /// Capturing audio.
    Recording,
    /// Recording finished; waiting for the user's credential.
    AwaitingCredential,
    /// Payload sent to the sealing service.
    Submitting,
    /// A seal was created and stored.
    Succeeded,
    /// Capture or submission failed.
    Failed,
}

impl RecordingPhase {
    /// Short human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            RecordingPhase::Idle => "idle",
            RecordingPhase::Recording => "recording",
            RecordingPhase::AwaitingCredential => "awaiting password",
            RecordingPhase::Submitting => "submitting",
            RecordingPhase::Succeeded => "sealed",
            RecordingPhase::Failed => "failed",
        }
    }

    /// Whether the session has ended and only `reset` or `start` applies.
    pub fn is_terminal(self) -> bool {
        matches!(self, RecordingPhase::Succeeded | RecordingPhase::Failed)
    }
}
