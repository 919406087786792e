//! One viewer endpoint: presence mirror, local trails, crossing feedback and
//! the outbound move throttle.

use std::time::Duration;

use fnv::FnvHashMap;
use glam::Vec2;
use rand::prelude::*;

use crate::audio::{AudioEngine, VoiceBank};
use crate::constants::{MAX_TRAIL_LENGTH, SEND_RATE};
use crate::crossing::find_crossing;
use crate::geometry::Viewport;
use crate::music::VoiceConfig;
use crate::protocol::{ClientMessage, Participant, ParticipantId, ServerMessage};
use crate::trail::TrailStore;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub max_trail_length: usize,
    pub send_rate: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_trail_length: MAX_TRAIL_LENGTH,
            send_rate: SEND_RATE,
        }
    }
}

/// Lets at most one emission through per `interval`.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// `now` is any monotonic timestamp (e.g. time since page load).
    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Local copy of the registry, written only by coordinator messages.
#[derive(Clone, Debug, Default)]
pub struct PresenceMirror {
    users: FnvHashMap<ParticipantId, Participant>,
}

impl PresenceMirror {
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.users.get(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.users.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &Participant)> {
        self.users.iter()
    }

    fn replace(&mut self, users: impl IntoIterator<Item = (ParticipantId, Participant)>) {
        self.users = users.into_iter().collect();
    }

    fn upsert(&mut self, id: ParticipantId, user: Participant) {
        self.users.insert(id, user);
    }

    fn set_position(&mut self, id: &ParticipantId, x: f64, y: f64) -> bool {
        match self.users.get_mut(id) {
            Some(u) => {
                u.x = x;
                u.y = y;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        self.users.remove(id)
    }
}

/// What a local pointer sample produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerOutcome {
    /// Move to send to the coordinator, if the throttle allowed one.
    pub outbound: Option<ClientMessage>,
    /// Foreign participant whose trail the new segment crossed.
    pub crossed: Option<ParticipantId>,
}

pub struct ClientSession<A: AudioEngine> {
    self_id: Option<ParticipantId>,
    mirror: PresenceMirror,
    trails: TrailStore,
    voices: VoiceBank<A>,
    throttle: Throttle,
    viewport: Viewport,
    audio_started: bool,
    rng: StdRng,
}

impl<A: AudioEngine> ClientSession<A> {
    pub fn new(engine: A, viewport: Viewport, config: SessionConfig, seed: u64) -> Self {
        Self {
            self_id: None,
            mirror: PresenceMirror::default(),
            trails: TrailStore::new(config.max_trail_length),
            voices: VoiceBank::new(engine),
            throttle: Throttle::new(config.send_rate),
            viewport,
            audio_started: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Applies one coordinator message to the mirror, trails and voices.
    pub fn apply(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Init { id, state } => {
                log::info!("joined as {} with {} participant(s)", id, state.users.len());
                self.self_id = Some(id);
                self.voices.dispose_all();
                self.trails.clear();
                for uid in state.users.keys() {
                    self.trails.reset(uid);
                }
                self.mirror.replace(state.users);
                if self.audio_started {
                    self.init_all_voices();
                }
            }
            ServerMessage::UserJoined { id, user } => {
                log::info!("participant {} joined", id);
                let sound_index = user.sound_index;
                self.mirror.upsert(id.clone(), user);
                self.trails.reset(&id);
                if self.audio_started {
                    self.init_voice(&id, sound_index);
                }
            }
            ServerMessage::UserMoved { id, x, y } => {
                if self.mirror.set_position(&id, x, y) {
                    self.trails.append(&id, Vec2::new(x as f32, y as f32));
                } else {
                    log::debug!("ignoring move for unknown participant {}", id);
                }
            }
            ServerMessage::UserLeft { id } => {
                log::info!("participant {} left", id);
                self.mirror.remove(&id);
                self.trails.remove(&id);
                self.voices.dispose(&id);
            }
        }
    }

    /// The explicit "start audio" gesture. Later calls are no-ops.
    pub fn start_audio(&mut self) {
        if self.audio_started {
            return;
        }
        self.audio_started = true;
        self.init_all_voices();
    }

    /// Handles one local pointer sample in screen space.
    ///
    /// Ignored until audio has started. Every sample extends the self trail
    /// and is checked for crossings immediately; only the outbound move is
    /// throttled.
    pub fn pointer_moved(&mut self, point: Vec2, now: Duration) -> PointerOutcome {
        let mut outcome = PointerOutcome::default();
        if !self.audio_started {
            return outcome;
        }
        let Some(me) = self.self_id.clone() else {
            return outcome;
        };

        let prev = self.trails.get(&me).and_then(|t| t.last()).unwrap_or(point);
        self.trails.append(&me, point);

        if let Some(victim) = find_crossing(prev, point, &self.trails, Some(&me), self.viewport) {
            let victim = victim.clone();
            self.voices.duck(&victim);
            outcome.crossed = Some(victim);
        }

        if self.throttle.ready(now) {
            let n = self.viewport.normalize(point);
            outcome.outbound = Some(ClientMessage::Move {
                x: f64::from(n.x),
                y: f64::from(n.y),
            });
        }
        outcome
    }

    /// Forgets the coordinator's view after the connection drops: no self id,
    /// no mirror, no trails and every voice released. Audio stays started so
    /// the next `init` rebuilds voices without another gesture.
    pub fn reset(&mut self) {
        log::info!("connection lost; dropping {} participant(s)", self.mirror.len());
        self.self_id = None;
        self.voices.dispose_all();
        self.trails.clear();
        self.mirror.replace(std::iter::empty());
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn self_id(&self) -> Option<&ParticipantId> {
        self.self_id.as_ref()
    }

    pub fn mirror(&self) -> &PresenceMirror {
        &self.mirror
    }

    pub fn trails(&self) -> &TrailStore {
        &self.trails
    }

    pub fn voices(&self) -> &VoiceBank<A> {
        &self.voices
    }

    /// Engine access for platform setup (e.g. resuming a suspended context).
    pub fn engine_mut(&mut self) -> &mut A {
        self.voices.engine_mut()
    }

    pub fn audio_started(&self) -> bool {
        self.audio_started
    }

    fn init_all_voices(&mut self) {
        let mut profiles: Vec<(ParticipantId, u8)> = Vec::with_capacity(self.mirror.len());
        if let Some(me) = &self.self_id {
            if let Some(u) = self.mirror.get(me) {
                profiles.push((me.clone(), u.sound_index));
            }
        }
        profiles.extend(
            self.mirror
                .iter()
                .filter(|(id, _)| Some(*id) != self.self_id.as_ref())
                .map(|(id, u)| (id.clone(), u.sound_index)),
        );
        for (id, sound_index) in profiles {
            self.init_voice(&id, sound_index);
        }
    }

    fn init_voice(&mut self, id: &ParticipantId, sound_index: u8) {
        let config = VoiceConfig::random(sound_index, &mut self.rng);
        self.voices.init_voice(id, &config);
    }
}
