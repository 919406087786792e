use rand::prelude::*;

use crate::constants::NOMINAL_VOLUME_DB;

/// Chord per sound profile, as MIDI note numbers (C4 = 60).
pub const CHORD_PALETTE: [[i32; 4]; 6] = [
    [60, 64, 67, 71], // C maj7
    [57, 60, 64, 67], // A min7
    [53, 57, 60, 64], // F maj7
    [55, 59, 62, 65], // G dom7
    [62, 65, 69, 72], // D min7
    [64, 67, 71, 74], // E min7
];

pub const LOOP_BPM: f32 = 120.0;
pub const BEATS_PER_MEASURE: f32 = 4.0;

/// Oscillator shape used by a participant's synth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Triangle,
    Sine,
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 3] = [Waveform::Triangle, Waveform::Sine, Waveform::Sawtooth];
}

/// ADSR envelope in seconds (sustain is a level in 0..1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopLength {
    TwoMeasures,
    FourMeasures,
}

impl LoopLength {
    pub fn measures(self) -> u32 {
        match self {
            LoopLength::TwoMeasures => 2,
            LoopLength::FourMeasures => 4,
        }
    }

    /// Loop period at [`LOOP_BPM`] in 4/4.
    pub fn seconds(self) -> f32 {
        self.measures() as f32 * BEATS_PER_MEASURE * 60.0 / LOOP_BPM
    }
}

/// Everything an audio engine needs to build one participant's voice.
///
/// Fields:
/// - `chord`: MIDI notes struck together every loop iteration
/// - `waveform`/`envelope`: timbre, picked per viewer
/// - `interval`: loop period, also the length of each struck chord
/// - `start_offset_sec`: delay before the first iteration
/// - `volume_db`: nominal output level the ducking ramp returns to
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceConfig {
    pub chord: [i32; 4],
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub interval: LoopLength,
    pub start_offset_sec: f32,
    pub volume_db: f32,
}

impl VoiceConfig {
    /// Voice for `sound_index` with randomized timbre, envelope and tempo.
    ///
    /// The chord is fixed by the coordinator-assigned profile; the rest is
    /// drawn locally, so two viewers may hear the same participant differently.
    pub fn random<R: Rng + ?Sized>(sound_index: u8, rng: &mut R) -> Self {
        let waveform = *Waveform::ALL.choose(rng).unwrap_or(&Waveform::Sine);
        let interval = if rng.gen_bool(0.5) {
            LoopLength::TwoMeasures
        } else {
            LoopLength::FourMeasures
        };
        Self {
            chord: chord_for(sound_index),
            waveform,
            envelope: Envelope {
                attack: rng.gen_range(0.05..2.0),
                decay: 0.3,
                sustain: 0.5,
                release: rng.gen_range(0.5..4.0),
            },
            interval,
            start_offset_sec: rng.gen_range(0.0..2.0),
            volume_db: NOMINAL_VOLUME_DB,
        }
    }

    pub fn chord_hz(&self) -> [f32; 4] {
        self.chord.map(|m| midi_to_hz(m as f32))
    }
}

#[inline]
/// Start time of the strike after `prev`, one `period` later, never earlier
/// than `earliest` (the first time the audio clock can still schedule).
#[inline]
pub fn next_strike(prev: f64, period: f64, earliest: f64) -> f64 {
    (prev + period).max(earliest)
}

pub fn chord_index(sound_index: u8) -> usize {
    sound_index as usize % CHORD_PALETTE.len()
}

#[inline]
pub fn chord_for(sound_index: u8) -> [i32; 4] {
    CHORD_PALETTE[chord_index(sound_index)]
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
