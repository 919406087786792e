use crosstrail_core::{
    chord_for, chord_index, db_to_gain, midi_to_hz, next_strike, LoopLength, VoiceConfig, CHORD_PALETTE,
    NOMINAL_VOLUME_DB,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn midi_to_hz_matches_a4_and_octave() {
    let a4 = midi_to_hz(69.0);
    assert!((a4 - 440.0).abs() < 1e-4);
    let a5 = midi_to_hz(81.0);
    assert!((a5 / a4 - 2.0).abs() < 1e-4);
}

#[test]
fn sound_index_wraps_around_the_palette() {
    assert_eq!(chord_index(0), 0);
    assert_eq!(chord_index(5), 5);
    assert_eq!(chord_index(6), 0);
    assert_eq!(chord_for(7), CHORD_PALETTE[1]);
}

#[test]
fn random_voice_stays_within_ranges() {
    let mut rng = StdRng::seed_from_u64(42);
    for i in 0..200u32 {
        let sound_index = (i % 6) as u8;
        let cfg = VoiceConfig::random(sound_index, &mut rng);
        assert_eq!(cfg.chord, CHORD_PALETTE[sound_index as usize]);
        assert!((0.05..2.0).contains(&cfg.envelope.attack));
        assert!((0.5..4.0).contains(&cfg.envelope.release));
        assert_eq!(cfg.envelope.decay, 0.3);
        assert_eq!(cfg.envelope.sustain, 0.5);
        assert!((0.0..2.0).contains(&cfg.start_offset_sec));
        assert_eq!(cfg.volume_db, NOMINAL_VOLUME_DB);
    }
}

#[test]
fn same_seed_gives_same_timbre() {
    let a = VoiceConfig::random(2, &mut StdRng::seed_from_u64(9));
    let b = VoiceConfig::random(2, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
}

#[test]
fn loop_lengths_at_120_bpm() {
    assert_eq!(LoopLength::TwoMeasures.seconds(), 4.0);
    assert_eq!(LoopLength::FourMeasures.seconds(), 8.0);
}

#[test]
fn db_to_gain_reference_points() {
    assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
    assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
    assert!(db_to_gain(-100.0) < 1e-4);
}

#[test]
fn strikes_repeat_a_full_period_after_the_offset_start() {
    let period = LoopLength::TwoMeasures.seconds() as f64;
    let first = 10.0 + 1.5;
    let mut t = first;
    let mut starts = vec![t];
    for tick in 1..4 {
        // Interval ticks fire `period` after the voice was created at 10.0.
        let earliest = 10.0 + tick as f64 * period + 0.05;
        t = next_strike(t, period, earliest);
        starts.push(t);
    }
    assert_eq!(starts, vec![11.5, 15.5, 19.5, 23.5]);
}

#[test]
fn late_tick_resumes_at_the_earliest_schedulable_time() {
    assert_eq!(next_strike(11.5, 4.0, 40.0), 40.0);
}
