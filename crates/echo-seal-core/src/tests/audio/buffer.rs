use crate::{
    CaptureError, SampleSink, StreamTap,
    audio::buffer::{CaptureShared, ChunkBuffer, MAX_BUFFER_SAMPLES, WAVEFORM_WINDOW},
};

use std::sync::{Arc, Mutex};

fn shared_pair() -> (SampleSink, StreamTap, Arc<CaptureShared>) {
    let shared = Arc::new(CaptureShared::new());
    (
        SampleSink::new(Arc::clone(&shared)),
        StreamTap::new(Arc::clone(&shared)),
        shared,
    )
}

/// WHAT: Chunk buffer respects MAX_BUFFER_SAMPLES limit
/// WHY: Prevents unbounded memory growth during long recordings
#[test]
fn given_buffer_at_max_capacity_when_adding_chunk_then_oldest_chunk_discarded() {
    // Given: A buffer filled to capacity with 0.0 chunks
    let mut buf = ChunkBuffer::default();
    let chunk_len = MAX_BUFFER_SAMPLES / 4;
    for _ in 0..4 {
        buf.push(vec![0.0f32; chunk_len]);
    }
    assert_eq!(buf.len(), MAX_BUFFER_SAMPLES);

    // When: Adding one more chunk of 1.0 samples
    buf.push(vec![1.0f32; 1024]);

    // Then: The oldest chunk is gone and the newest samples are last
    assert_eq!(buf.len(), chunk_len * 3 + 1024);
    let samples = buf.take_samples();
    assert!((samples[samples.len() - 1] - 1.0).abs() < f32::EPSILON);
    assert_eq!(buf.len(), 0);
}

/// WHAT: Chunks are assembled in arrival order
/// WHY: Payload audio must play back in the order it was spoken
#[test]
fn given_several_chunks_when_taking_samples_then_order_preserved() {
    // Given: Three chunks
    let mut buf = ChunkBuffer::default();
    buf.push(vec![0.1, 0.2]);
    buf.push(Vec::new());
    buf.push(vec![0.3]);

    // When: Taking the samples
    let samples = buf.take_samples();

    // Then: Concatenated in order, empty chunk ignored
    assert_eq!(samples, vec![0.1, 0.2, 0.3]);
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: Ensures audio data is never silently lost on mutex poison
#[test]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(ChunkBuffer::default()));
    buf.lock().unwrap().push(vec![0.5f32; 100]);
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from poisoned lock using unwrap_or_else
    let samples = buf.lock().unwrap_or_else(|e| e.into_inner()).take_samples();

    // Then: Original data is fully preserved
    assert_eq!(samples.len(), 100);
    assert!(samples.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Concurrent sink writers produce consistent state
/// WHY: Audio callbacks and readers contend for the same buffers
#[test]
fn given_concurrent_writers_when_pushing_then_all_samples_accounted() {
    // Given: One sink shared by four writer threads
    let (sink, tap, shared) = shared_pair();
    let mut handles = vec![];

    // When: 4 threads push 1000 chunks of 48 samples each
    for i in 0..4u8 {
        let sink = sink.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..1000 {
                sink.push(vec![f32::from(i) / 4.0; 48]);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // Then: Every sample is buffered and the waveform window is bounded
    assert_eq!(tap.buffered_samples(), 4 * 1000 * 48);
    assert_eq!(tap.waveform().unwrap().len(), WAVEFORM_WINDOW);
    assert!(shared.take_samples().iter().all(|s| s.is_finite()));
}

/// WHAT: A deactivated session ignores late callbacks and closes its taps
/// WHY: A callback firing after release must not write into a finished recording
#[test]
fn given_deactivated_session_when_pushing_and_reading_then_ignored_and_closed() {
    // Given: A session with some audio, then deactivated
    let (sink, tap, shared) = shared_pair();
    sink.push(vec![0.1; 10]);
    assert_eq!(tap.waveform().unwrap().len(), 10);
    assert_eq!(tap.read_count(), 1);
    shared.deactivate();

    // When: A late callback delivers samples and a reader samples the tap
    sink.push(vec![0.2; 10]);
    let read = tap.waveform();

    // Then: Nothing is appended, the read fails, and no read is counted
    assert!(!sink.is_open());
    assert_eq!(tap.buffered_samples(), 10);
    assert!(matches!(read, Err(CaptureError::StreamClosed { .. })));
    assert_eq!(tap.read_count(), 1);
}
