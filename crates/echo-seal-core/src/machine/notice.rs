use std::time::{Duration, Instant};

/// How long a notice stays visible unless stated otherwise.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(3);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
    /// Something needs attention.
    Warning,
    /// Neutral information.
    Info,
}

/// A short-lived user notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastNotification {
    /// Text to show.
    pub message: String,
    /// Severity.
    pub kind: ToastKind,
    /// Time to live.
    pub ttl: Duration,
    /// When the notice was raised.
    pub created_at: Instant,
}

impl ToastNotification {
    /// Notice of `kind` with the default TTL, raised now.
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            ttl: DEFAULT_TOAST_TTL,
            created_at: Instant::now(),
        }
    }

    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Success)
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error)
    }

    /// Warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Warning)
    }

    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Info)
    }

    /// When the notice should disappear.
    pub fn expires_at(&self) -> Instant {
        self.created_at + self.ttl
    }

    /// Whether the notice has expired at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}
