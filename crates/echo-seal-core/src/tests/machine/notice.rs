use crate::{DEFAULT_TOAST_TTL, ToastKind, ToastNotification};

use std::time::Duration;

/// WHAT: Notices expire after their TTL
/// WHY: Toasts are transient and auto-dismissed
#[test]
fn given_new_toast_when_checking_expiry_then_expires_after_ttl() {
    let toast = ToastNotification::error("Failed to create seal");

    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.ttl, DEFAULT_TOAST_TTL);
    assert!(!toast.is_expired_at(toast.created_at));
    assert!(!toast.is_expired_at(toast.created_at + Duration::from_millis(2999)));
    assert!(toast.is_expired_at(toast.created_at + Duration::from_secs(3)));
}
