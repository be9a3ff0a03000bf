use crate::{
    AudioCapture, CaptureError, FrameLoop,
    tests::support::{FakeBackend, FakeMode, tone},
};

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// WHAT: Stop releases every track and closes the context
/// WHY: Leaking the capture device would lock the microphone
#[test]
fn given_started_session_when_stopped_then_device_fully_released() {
    // Given: A live session on a fake device
    let (backend, device) = FakeBackend::new(FakeMode::Tone);
    let capture = AudioCapture::new(Box::new(backend));
    let session = capture.start().unwrap();
    assert_eq!(device.active_tracks(), 1);
    assert!(capture.is_active());

    // When: Stopping
    let payload = session.stop().unwrap();

    // Then: Zero active tracks, closed context, slot free
    assert_eq!(device.active_tracks(), 0);
    assert!(device.context_closed());
    assert!(!capture.is_active());
    assert!(!payload.bytes().is_empty());
}

/// WHAT: An empty recording still releases the device
/// WHY: Release is unconditional on every exit path
#[test]
fn given_silent_session_when_stopped_then_no_audio_error_and_device_released() {
    let (backend, device) = FakeBackend::new(FakeMode::Silent);
    let capture = AudioCapture::new(Box::new(backend));
    let session = capture.start().unwrap();

    let result = session.stop();

    assert!(matches!(result, Err(CaptureError::NoAudioCaptured { .. })));
    assert_eq!(device.active_tracks(), 0);
    assert!(device.context_closed());
    assert!(!capture.is_active());
}

/// WHAT: Dropping a session without stop releases the device
/// WHY: Error paths that abandon a session must not leak it
#[test]
fn given_started_session_when_dropped_then_device_released() {
    let (backend, device) = FakeBackend::new(FakeMode::Tone);
    let capture = AudioCapture::new(Box::new(backend));

    {
        let _session = capture.start().unwrap();
        assert_eq!(device.active_tracks(), 1);
    }

    assert_eq!(device.active_tracks(), 0);
    assert!(!capture.is_active());
}

/// WHAT: A second start while active fails without touching the live session
/// WHY: Only one microphone acquisition may be in flight
#[test]
fn given_active_session_when_starting_again_then_session_already_active() {
    // Given: A live session
    let (backend, device) = FakeBackend::new(FakeMode::Tone);
    let capture = AudioCapture::new(Box::new(backend));
    let session = capture.start().unwrap();
    let id = session.id();

    // When: Starting again
    let second = capture.start();

    // Then: Rejected; the device was not reopened and the first session still records
    assert!(matches!(second, Err(CaptureError::SessionAlreadyActive { .. })));
    assert_eq!(device.opened(), 1);
    assert_eq!(device.active_tracks(), 1);
    assert!(session.tap().is_active());
    assert_eq!(session.id(), id);

    device.push(tone(160, 0.2));
    assert!(session.stop().is_ok());

    // And: A new session can start after the first stops
    let third = capture.start().unwrap();
    assert_ne!(third.id(), id);
}

/// WHAT: Permission refusal surfaces as PermissionDenied and frees the slot
/// WHY: The user can retry after granting access
#[test]
fn given_denied_device_when_starting_then_permission_denied_and_retryable() {
    let (backend, device) = FakeBackend::new(FakeMode::Denied);
    let capture = AudioCapture::new(Box::new(backend));

    let result = capture.start();

    let Err(err) = result else {
        panic!("start should fail");
    };
    assert!(matches!(err, CaptureError::PermissionDenied { .. }));
    assert_eq!(err.notice_text(), "Microphone access denied!");
    assert_eq!(device.active_tracks(), 0);
    assert!(!capture.is_active());
}

/// WHAT: Frame loop makes no sampling call after capture stops
/// WHY: A dangling read after stop would touch a released stream
#[tokio::test]
async fn given_running_frame_loop_when_session_stops_then_no_further_reads() {
    // Given: A frame loop sampling a live session
    let (backend, device) = FakeBackend::new(FakeMode::Tone);
    let capture = AudioCapture::new(Box::new(backend));
    let session = capture.start().unwrap();
    let tap = session.tap();
    let frames = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&frames);
    let frame_loop = FrameLoop::spawn(tap.clone(), Duration::from_millis(2), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });

    while frames.load(Ordering::SeqCst) < 3 {
        device.push(tone(64, 0.2));
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // When: The session stops with frames still scheduled
    session.stop().unwrap();
    let reads_at_stop = tap.read_count();
    let frames_at_stop = frames.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Then: No further reads or frames, and the loop has exited on its own
    assert_eq!(tap.read_count(), reads_at_stop);
    assert_eq!(frames.load(Ordering::SeqCst), frames_at_stop);
    assert!(frame_loop.is_finished());
}

/// WHAT: The default microphone records and releases through CPAL
/// WHY: Verifies the real backend end to end on a machine with a mic
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn given_default_microphone_when_recording_briefly_then_payload_and_released() {
    // Given: The CPAL backend on the default input device
    let capture = AudioCapture::new(Box::new(crate::CpalBackend::new(None)));

    // When: Recording for half a second
    let session = capture.start().unwrap();
    assert!(session.format().sample_rate > 0);
    std::thread::sleep(Duration::from_millis(500));
    let payload = session.stop().unwrap();

    // Then: Audio was captured and the slot is free again
    assert!(payload.duration() > Duration::ZERO);
    assert!(!capture.is_active());
}
