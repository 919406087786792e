//! Seam between the core and a concrete audio engine.
//!
//! The core decides *when* voices are built, ducked and released; the engine
//! (WebAudio in the browser, a fake in tests) decides how.

use fnv::FnvHashMap;
use thiserror::Error;

use crate::constants::{
    DUCK_DROP_SEC, DUCK_FLOOR_DB, DUCK_RECOVER_DELAY_SEC, DUCK_RECOVER_SEC, NOMINAL_VOLUME_DB,
};
use crate::music::VoiceConfig;
use crate::protocol::ParticipantId;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to create {node}: {reason}")]
    Create { node: &'static str, reason: String },
    #[error("failed to release {part:?}: {reason}")]
    Release { part: VoicePart, reason: String },
    #[error("automation failed: {0}")]
    Automation(String),
}

/// Independently releasable pieces of a voice, in release order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoicePart {
    Notes,
    Synth,
    Volume,
    Loop,
}

impl VoicePart {
    pub const RELEASE_ORDER: [VoicePart; 4] = [
        VoicePart::Notes,
        VoicePart::Synth,
        VoicePart::Volume,
        VoicePart::Loop,
    ];
}

/// Volume dip applied to a crossed participant: fast drop, slower recovery.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DuckEnvelope {
    pub floor_db: f32,
    pub drop_sec: f64,
    pub recover_db: f32,
    pub recover_delay_sec: f64,
    pub recover_sec: f64,
}

impl Default for DuckEnvelope {
    fn default() -> Self {
        Self {
            floor_db: DUCK_FLOOR_DB,
            drop_sec: DUCK_DROP_SEC,
            recover_db: NOMINAL_VOLUME_DB,
            recover_delay_sec: DUCK_RECOVER_DELAY_SEC,
            recover_sec: DUCK_RECOVER_SEC,
        }
    }
}

pub trait AudioEngine {
    type Voice;

    /// Builds and starts a self-repeating voice.
    fn create_voice(&mut self, config: &VoiceConfig) -> Result<Self::Voice, AudioError>;

    /// Cancels any scheduled volume automation on the voice.
    fn cancel_ramps(&mut self, voice: &mut Self::Voice) -> Result<(), AudioError>;

    /// Ramps the voice's output level to `db` over `duration_sec`, starting
    /// `delay_sec` from now.
    fn ramp_volume(
        &mut self,
        voice: &mut Self::Voice,
        db: f32,
        duration_sec: f64,
        delay_sec: f64,
    ) -> Result<(), AudioError>;

    fn release(&mut self, voice: &mut Self::Voice, part: VoicePart) -> Result<(), AudioError>;

    /// Fire-and-forget dip: cancel, drop to the floor, then recover.
    fn duck(&mut self, voice: &mut Self::Voice, env: &DuckEnvelope) -> Result<(), AudioError> {
        self.cancel_ramps(voice)?;
        self.ramp_volume(voice, env.floor_db, env.drop_sec, 0.0)?;
        self.ramp_volume(voice, env.recover_db, env.recover_sec, env.recover_delay_sec)
    }
}

/// Live voices keyed by participant.
pub struct VoiceBank<A: AudioEngine> {
    engine: A,
    voices: FnvHashMap<ParticipantId, A::Voice>,
    duck_envelope: DuckEnvelope,
}

impl<A: AudioEngine> VoiceBank<A> {
    pub fn new(engine: A) -> Self {
        Self {
            engine,
            voices: FnvHashMap::default(),
            duck_envelope: DuckEnvelope::default(),
        }
    }

    /// (Re)builds `id`'s voice, disposing any previous one first.
    pub fn init_voice(&mut self, id: &ParticipantId, config: &VoiceConfig) {
        self.dispose(id);
        match self.engine.create_voice(config) {
            Ok(voice) => {
                log::info!("participant {} sound ready, chord {:?}", id, config.chord);
                self.voices.insert(id.clone(), voice);
            }
            Err(e) => log::warn!("participant {} has no sound: {}", id, e),
        }
    }

    /// Ducks `id`'s voice. Returns false when it has none.
    pub fn duck(&mut self, id: &ParticipantId) -> bool {
        let Some(voice) = self.voices.get_mut(id) else {
            return false;
        };
        if let Err(e) = self.engine.duck(voice, &self.duck_envelope) {
            log::warn!("ducking {} failed: {}", id, e);
        }
        true
    }

    /// Releases every part of `id`'s voice. Each part is attempted even if an
    /// earlier one fails; failures are logged and swallowed.
    pub fn dispose(&mut self, id: &ParticipantId) -> bool {
        let Some(mut voice) = self.voices.remove(id) else {
            return false;
        };
        for part in VoicePart::RELEASE_ORDER {
            if let Err(e) = self.engine.release(&mut voice, part) {
                log::warn!("cleanup error for {}: {}", id, e);
            }
        }
        true
    }

    pub fn dispose_all(&mut self) {
        let ids: Vec<ParticipantId> = self.voices.keys().cloned().collect();
        for id in &ids {
            self.dispose(id);
        }
    }

    pub fn has_voice(&self, id: &ParticipantId) -> bool {
        self.voices.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn engine(&self) -> &A {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut A {
        &mut self.engine
    }
}
