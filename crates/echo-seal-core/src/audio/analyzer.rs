//! Real-time signal feedback for a live capture session.
//!
//! [`SignalAnalyzer`] turns the current waveform window into a scalar
//! amplitude and a set of frequency bars. [`FrameLoop`] drives it at display
//! rate and stops on its own once capture becomes inactive.

use crate::{CaptureResult, audio::StreamTap};

use std::{f32::consts::PI, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::debug;

/// Amplitude above which the signal is [`SignalLevel::High`].
pub const LEVEL_HIGH_THRESHOLD: f32 = 20.0;
/// Amplitude above which the signal is [`SignalLevel::Medium`].
pub const LEVEL_MEDIUM_THRESHOLD: f32 = 10.0;

/// Transform size for the frequency bars.
pub const FFT_SIZE: usize = 256;
/// Number of frequency bars per frame.
pub const BAR_COUNT: usize = FFT_SIZE / 2;

/// Default pacing of the frame loop (~30fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Coarse signal classification for the level indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLevel {
    /// Silence or very quiet input.
    Low,
    /// Normal speaking level.
    Medium,
    /// Loud input.
    High,
}

impl SignalLevel {
    /// Classify an amplitude against the level thresholds.
    pub fn from_amplitude(amplitude: f32) -> Self {
        if amplitude > LEVEL_HIGH_THRESHOLD {
            SignalLevel::High
        } else if amplitude > LEVEL_MEDIUM_THRESHOLD {
            SignalLevel::Medium
        } else {
            SignalLevel::Low
        }
    }
}

/// One frame of visual feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    /// Mean absolute deviation from the midpoint, on a 0-128 byte scale.
    pub amplitude: f32,
    /// Per-bin energy on a 0-255 scale, [`BAR_COUNT`] entries, low to high.
    pub bars: Vec<u8>,
}

impl SignalFrame {
    /// Level classification of this frame's amplitude.
    pub fn level(&self) -> SignalLevel {
        SignalLevel::from_amplitude(self.amplitude)
    }
}

/// Stateless per-frame analysis over a [`StreamTap`].
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    window: Vec<f32>,
    cos_table: Vec<f32>,
    sin_table: Vec<f32>,
}

impl SignalAnalyzer {
    /// Build an analyzer with precomputed window and twiddle tables.
    pub fn new() -> Self {
        let n = FFT_SIZE as f32;
        // Blackman window
        let window = (0..FFT_SIZE)
            .map(|i| {
                let x = i as f32 / n;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();
        let cos_table = (0..FFT_SIZE).map(|i| (2.0 * PI * i as f32 / n).cos()).collect();
        let sin_table = (0..FFT_SIZE).map(|i| (2.0 * PI * i as f32 / n).sin()).collect();

        Self {
            window,
            cos_table,
            sin_table,
        }
    }

    /// Read the tap's current waveform and analyze it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CaptureError::StreamClosed`] if capture has stopped.
    #[track_caller]
    pub fn sample(&self, tap: &StreamTap) -> CaptureResult<SignalFrame> {
        let waveform = tap.waveform()?;
        Ok(self.analyze(&waveform))
    }

    /// Analyze a waveform slice without touching any stream.
    pub fn analyze(&self, waveform: &[f32]) -> SignalFrame {
        SignalFrame {
            amplitude: amplitude(waveform),
            bars: self.frequency_bars(waveform),
        }
    }

    fn frequency_bars(&self, waveform: &[f32]) -> Vec<u8> {
        // Latest FFT_SIZE samples, zero-padded at the front when short.
        let mut block = vec![0.0f32; FFT_SIZE];
        let take = waveform.len().min(FFT_SIZE);
        block[FFT_SIZE - take..].copy_from_slice(&waveform[waveform.len() - take..]);

        for (sample, weight) in block.iter_mut().zip(&self.window) {
            *sample *= weight;
        }

        (0..BAR_COUNT)
            .map(|k| {
                let (mut re, mut im) = (0.0f32, 0.0f32);
                for (n, &x) in block.iter().enumerate() {
                    let idx = (k * n) % FFT_SIZE;
                    re += x * self.cos_table[idx];
                    im -= x * self.sin_table[idx];
                }
                let magnitude = (re * re + im * im).sqrt() / FFT_SIZE as f32;
                to_byte_scale(magnitude)
            })
            .collect()
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean absolute deviation of byte-quantised samples from the midpoint (128).
pub fn amplitude(waveform: &[f32]) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }

    let sum: f32 = waveform
        .iter()
        .map(|&s| ((128.0 * (1.0 + s)).clamp(0.0, 255.0).floor() - 128.0).abs())
        .sum();

    sum / waveform.len() as f32
}

fn to_byte_scale(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

/// Fire-and-forget frame pacing for a [`SignalAnalyzer`].
///
/// The loop checks the tap before every frame and exits as soon as capture is
/// inactive, so no sample is read from a stopped session. Dropping the
/// handle aborts any pending frame.
pub struct FrameLoop {
    handle: JoinHandle<()>,
}

impl FrameLoop {
    /// Start sampling `tap` every `period`, passing frames to `on_frame`.
    ///
    /// `on_frame` returns `false` to end the loop early.
    pub fn spawn<F>(tap: StreamTap, period: Duration, mut on_frame: F) -> Self
    where
        F: FnMut(SignalFrame) -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let analyzer = SignalAnalyzer::new();
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if !tap.is_active() {
                    debug!("Capture inactive, frame loop exiting");
                    break;
                }

                match analyzer.sample(&tap) {
                    Ok(frame) => {
                        if !on_frame(frame) {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "Frame loop stopped");
                        break;
                    }
                }
            }
        });

        Self { handle }
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
