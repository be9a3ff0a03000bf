use crate::{BAR_COUNT, SignalAnalyzer, SignalLevel, amplitude, tests::support::tone};

/// WHAT: Level thresholds are strict
/// WHY: Exactly 10 or 20 must stay in the lower band
#[test]
fn given_threshold_amplitudes_when_classifying_then_strictly_greater_required() {
    assert_eq!(SignalLevel::from_amplitude(0.0), SignalLevel::Low);
    assert_eq!(SignalLevel::from_amplitude(10.0), SignalLevel::Low);
    assert_eq!(SignalLevel::from_amplitude(10.5), SignalLevel::Medium);
    assert_eq!(SignalLevel::from_amplitude(20.0), SignalLevel::Medium);
    assert_eq!(SignalLevel::from_amplitude(20.5), SignalLevel::High);
}

/// WHAT: Amplitude is the mean absolute deviation from the byte midpoint
/// WHY: Level indicator must match the 0-255 byte waveform scale
#[test]
fn given_known_waveforms_when_measuring_then_mean_deviation_returned() {
    // Silence sits exactly on the midpoint
    assert!(amplitude(&[0.0; 64]).abs() < f32::EPSILON);

    // +-0.5 quantises to 192 and 64, both 64 away from 128
    let square: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
    assert!((amplitude(&square) - 64.0).abs() < f32::EPSILON);

    // Out-of-range samples are clamped to the byte range
    assert!((amplitude(&[4.0]) - 127.0).abs() < f32::EPSILON);

    assert!(amplitude(&[]).abs() < f32::EPSILON);
}

/// WHAT: Frames carry a fixed bar count
/// WHY: Renderers size their meter once
#[test]
fn given_short_and_long_waveforms_when_analyzing_then_bar_count_fixed() {
    let analyzer = SignalAnalyzer::new();

    assert_eq!(analyzer.analyze(&[]).bars.len(), BAR_COUNT);
    assert_eq!(analyzer.analyze(&tone(100, 0.3)).bars.len(), BAR_COUNT);
    assert_eq!(analyzer.analyze(&tone(4096, 0.3)).bars.len(), BAR_COUNT);
}

/// WHAT: Silence yields empty bars, a tone lights some up
/// WHY: Visual feedback must reflect actual input energy
#[test]
fn given_silence_and_tone_when_analyzing_then_bars_reflect_energy() {
    let analyzer = SignalAnalyzer::new();

    let silent = analyzer.analyze(&[0.0; 256]);
    assert!(silent.bars.iter().all(|&b| b == 0));
    assert_eq!(silent.level(), SignalLevel::Low);

    let loud = analyzer.analyze(&tone(256, 0.8));
    assert!(loud.bars.iter().any(|&b| b > 0));
    assert_eq!(loud.level(), SignalLevel::High);
}
