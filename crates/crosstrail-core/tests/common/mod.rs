// Shared fakes for the coordinator and session tests.

#![allow(dead_code)]
use std::sync::{Arc, Mutex};

use crosstrail_core::{
    AudioEngine, AudioError, Outbox, ServerMessage, VoiceConfig, VoicePart,
};

/// Outbox that records every delivered message.
#[derive(Clone, Default)]
pub struct RecordingOutbox {
    pub sent: Arc<Mutex<Vec<ServerMessage>>>,
}

impl RecordingOutbox {
    pub fn messages(&self) -> Vec<ServerMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Outbox for RecordingOutbox {
    type Error = String;

    fn deliver(&self, msg: &ServerMessage) -> Result<(), Self::Error> {
        self.sent.lock().unwrap().push(msg.clone());
        Ok(())
    }
}

/// Outbox whose peer has gone away.
pub struct ClosedOutbox;

impl Outbox for ClosedOutbox {
    type Error = &'static str;

    fn deliver(&self, _msg: &ServerMessage) -> Result<(), Self::Error> {
        Err("channel closed")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCall {
    Create(u32, [i32; 4]),
    Cancel(u32),
    Ramp { voice: u32, db: f32, duration: f64, delay: f64 },
    Release(u32, VoicePart),
}

/// Audio engine that only records what the core asked of it.
#[derive(Default)]
pub struct FakeAudio {
    pub calls: Vec<AudioCall>,
    pub failing_parts: Vec<VoicePart>,
    next_voice: u32,
}

impl FakeAudio {
    pub fn duck_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, AudioCall::Cancel(_)))
            .count()
    }

    pub fn created(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, AudioCall::Create(..)))
            .count()
    }

    pub fn releases(&self) -> Vec<(u32, VoicePart)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Release(v, p) => Some((*v, *p)),
                _ => None,
            })
            .collect()
    }
}

impl AudioEngine for FakeAudio {
    type Voice = u32;

    fn create_voice(&mut self, config: &VoiceConfig) -> Result<Self::Voice, AudioError> {
        self.next_voice += 1;
        self.calls.push(AudioCall::Create(self.next_voice, config.chord));
        Ok(self.next_voice)
    }

    fn cancel_ramps(&mut self, voice: &mut Self::Voice) -> Result<(), AudioError> {
        self.calls.push(AudioCall::Cancel(*voice));
        Ok(())
    }

    fn ramp_volume(
        &mut self,
        voice: &mut Self::Voice,
        db: f32,
        duration_sec: f64,
        delay_sec: f64,
    ) -> Result<(), AudioError> {
        self.calls.push(AudioCall::Ramp {
            voice: *voice,
            db,
            duration: duration_sec,
            delay: delay_sec,
        });
        Ok(())
    }

    fn release(&mut self, voice: &mut Self::Voice, part: VoicePart) -> Result<(), AudioError> {
        self.calls.push(AudioCall::Release(*voice, part));
        if self.failing_parts.contains(&part) {
            return Err(AudioError::Release {
                part,
                reason: "already disposed".into(),
            });
        }
        Ok(())
    }
}
