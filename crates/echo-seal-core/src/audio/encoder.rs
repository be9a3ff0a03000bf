use crate::{CaptureError, CaptureResult};

use std::{fmt, io::Cursor, panic::Location, time::Duration};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use uuid::Uuid;

/// Encoding label attached to every payload.
pub const PAYLOAD_MIME: &str = "audio/wav";
/// File name the payload is uploaded under.
pub const PAYLOAD_FILE_NAME: &str = "voice.wav";

/// A finished recording, encoded and ready for submission.
#[derive(Clone)]
pub struct AudioPayload {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    sample_rate: u32,
    sample_count: usize,
    bytes: Vec<u8>,
}

impl AudioPayload {
    /// Session that produced this payload.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// When the producing session started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Encoding label, always [`PAYLOAD_MIME`].
    pub fn mime_type(&self) -> &'static str {
        PAYLOAD_MIME
    }

    /// Encoded WAV bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length of the recording.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.sample_count as f64 / f64::from(self.sample_rate))
    }
}

impl fmt::Debug for AudioPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioPayload")
            .field("session_id", &self.session_id)
            .field("started_at", &self.started_at)
            .field("sample_rate", &self.sample_rate)
            .field("sample_count", &self.sample_count)
            .field("byte_len", &self.bytes.len())
            .finish()
    }
}

/// Assemble buffered mono samples into a 16-bit PCM WAV payload.
#[track_caller]
pub(crate) fn encode_wav(
    session_id: Uuid,
    started_at: DateTime<Utc>,
    samples: &[f32],
    sample_rate: u32,
) -> CaptureResult<AudioPayload> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    // 44-byte RIFF header plus two bytes per sample
    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));

    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| CaptureError::EncodingFailed {
                reason: format!("Failed to create WAV writer: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        for &sample in samples {
            writer
                .write_sample(to_pcm16(sample))
                .map_err(|e| CaptureError::EncodingFailed {
                    reason: format!("Failed to write sample: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        writer.finalize().map_err(|e| CaptureError::EncodingFailed {
            reason: format!("Failed to finalize WAV: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
    }

    Ok(AudioPayload {
        session_id,
        started_at,
        sample_rate,
        sample_count: samples.len(),
        bytes: cursor.into_inner(),
    })
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
