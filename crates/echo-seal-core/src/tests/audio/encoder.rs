use crate::{PAYLOAD_MIME, audio::encoder::encode_wav, tests::support::tone};

use std::{io::Cursor, time::Duration};

use chrono::Utc;
use uuid::Uuid;

/// WHAT: Encoded payload is a readable mono 16-bit WAV
/// WHY: The sealing service expects a standard audio/wav upload
#[test]
fn given_samples_when_encoding_then_valid_wav_with_same_length() {
    // Given: One second of tone at 16kHz
    let samples = tone(16_000, 0.5);
    let session_id = Uuid::new_v4();

    // When: Encoding
    let payload = encode_wav(session_id, Utc::now(), &samples, 16_000).unwrap();

    // Then: The header and sample count round-trip through a WAV reader
    let reader = hound::WavReader::new(Cursor::new(payload.bytes().to_vec())).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, samples.len());

    assert_eq!(payload.session_id(), session_id);
    assert_eq!(payload.mime_type(), PAYLOAD_MIME);
    assert_eq!(payload.duration(), Duration::from_secs(1));
}

/// WHAT: Out-of-range samples are clamped, not wrapped
/// WHY: Clipping must not turn into loud inverted spikes
#[test]
fn given_out_of_range_samples_when_encoding_then_clamped_to_pcm_limits() {
    let payload = encode_wav(Uuid::new_v4(), Utc::now(), &[2.0, -2.0], 8_000).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(payload.into_bytes())).unwrap();
    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

    assert_eq!(decoded, vec![i16::MAX, -i16::MAX]);
}
